use crate::{
    api::{attendance, payroll},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_default_per_min))
            .service(
                web::scope("/attendance")
                    // /attendance/clock-in (own limiter)
                    .service(
                        web::resource("/clock-in")
                            .wrap(build_limiter(config.rate_clock_per_min))
                            .route(web::post().to(attendance::clock_in)),
                    )
                    // /attendance/clock-out
                    .service(
                        web::resource("/clock-out")
                            .wrap(build_limiter(config.rate_clock_per_min))
                            .route(web::put().to(attendance::clock_out)),
                    )
                    // /attendance/break/start + /attendance/break/end
                    .service(
                        web::resource("/break/start")
                            .route(web::post().to(attendance::start_break)),
                    )
                    .service(
                        web::resource("/break/end").route(web::put().to(attendance::end_break)),
                    )
                    // /attendance/stats
                    .service(
                        web::resource("/stats").route(web::get().to(attendance::attendance_stats)),
                    )
                    // /attendance
                    .service(
                        web::resource("").route(web::get().to(attendance::attendance_list)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll/calculate (pure preview)
                    .service(
                        web::resource("/calculate")
                            .route(web::post().to(payroll::calculate_payroll)),
                    )
                    // /payroll/summary
                    .service(
                        web::resource("/summary").route(web::get().to(payroll::payroll_summary)),
                    )
                    // /payroll
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::create_payroll))
                            .route(web::get().to(payroll::list_payrolls)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::put().to(payroll::update_payroll)),
                    )
                    // /payroll/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(payroll::approve_payroll)),
                    )
                    // /payroll/{id}/pay
                    .service(
                        web::resource("/{id}/pay").route(web::put().to(payroll::process_payment)),
                    ),
            ),
    );
}

// CLOCK-IN
//  ├─ schedule resolution (shift > policy > defaults)
//  ├─ geofence + lateness checks
//  └─ record persisted as clocked_in

// CLOCK-OUT
//  ├─ early-leave + duration
//  └─ penalty evaluation (best-effort, never blocks)
