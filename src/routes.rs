use crate::{
    api::{approvals, attendance, employees, queue, reports, services, stores, tickets},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Per-route limiter. Inputs come straight from env vars, so a zero or
// oversized rate clamps instead of producing an unbuildable config.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / burst as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(handlers::protected)
            .service(
                web::scope("/tickets")
                    // /tickets
                    .service(
                        web::resource("")
                            .route(web::post().to(tickets::create_ticket))
                            .route(web::get().to(tickets::list_tickets)),
                    )
                    // /tickets/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(tickets::get_ticket))
                            .route(web::put().to(tickets::update_ticket)),
                    )
                    // /tickets/{id}/close
                    .service(
                        web::resource("/{id}/close").route(web::post().to(tickets::close_ticket)),
                    )
                    // /tickets/{id}/void
                    .service(
                        web::resource("/{id}/void").route(web::post().to(tickets::void_ticket)),
                    ),
            )
            .service(
                web::scope("/approvals")
                    // /approvals
                    .service(
                        web::resource("").route(web::get().to(approvals::pending_approvals)),
                    )
                    // /approvals/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(approvals::approve_ticket)),
                    )
                    // /approvals/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(approvals::reject_ticket)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::put().to(attendance::check_out)),
                    ),
            )
            .service(
                web::scope("/queue")
                    .service(web::resource("/join").route(web::post().to(queue::join_queue)))
                    .service(web::resource("/leave").route(web::delete().to(queue::leave_queue)))
                    .service(
                        web::resource("/{store_id}")
                            .route(web::get().to(queue::sorted_technicians)),
                    )
                    .service(
                        web::resource("/{store_id}/assign")
                            .route(web::post().to(queue::assign_next)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employees::create_employee))
                            .route(web::get().to(employees::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employees::get_employee))
                            .route(web::put().to(employees::update_employee))
                            .route(web::delete().to(employees::delete_employee)),
                    ),
            )
            .service(
                web::scope("/services")
                    .service(
                        web::resource("")
                            .route(web::post().to(services::create_service))
                            .route(web::get().to(services::list_services)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(services::get_service))
                            .route(web::put().to(services::update_service))
                            .route(web::delete().to(services::delete_service)),
                    ),
            )
            .service(
                web::scope("/stores")
                    .service(web::resource("/{id}").route(web::get().to(stores::get_store)))
                    .service(
                        web::resource("/{id}/settings")
                            .route(web::put().to(stores::update_settings)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("/end-of-day").route(web::get().to(reports::end_of_day)),
                    )
                    .service(
                        web::resource("/end-of-day/export")
                            .route(web::get().to(reports::export_end_of_day)),
                    )
                    .service(
                        web::resource("/payroll-period")
                            .route(web::get().to(reports::payroll_period)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_still_builds_a_limiter() {
        let _ = build_limiter(0);
    }

    #[test]
    fn oversized_rate_still_builds_a_limiter() {
        let _ = build_limiter(u32::MAX);
    }
}
