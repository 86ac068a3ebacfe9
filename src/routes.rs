use crate::{
    api::{dashboard, employee, payroll, report, settings, user},
    config::Config,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::post().to(employee::update_employee_status)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/payrolls")
                    .service(
                        web::resource("")
                            .route(web::post().to(payroll::create_payroll))
                            .route(web::get().to(payroll::list_payrolls)),
                    )
                    // literal routes before the {id} matcher
                    .service(
                        web::resource("/paid").route(web::get().to(payroll::list_paid_payrolls)),
                    )
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(payroll::list_pending_payrolls)),
                    )
                    .service(
                        web::resource("/{id}/mark-paid")
                            .route(web::post().to(payroll::mark_payroll_paid)),
                    )
                    .service(
                        web::resource("/{id}/payslip")
                            .route(web::get().to(payroll::download_payslip)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll))),
            )
            .service(
                web::scope("/reports")
                    .service(web::resource("").route(web::get().to(report::list_reports)))
                    .service(
                        web::resource("/generate").route(web::post().to(report::generate_report)),
                    )
                    .service(
                        web::resource("/{id}/download")
                            .route(web::get().to(report::download_report)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(report::delete_report))),
            )
            .service(
                web::scope("/users")
                    .service(web::resource("").route(web::post().to(user::register_user)))
                    .service(
                        web::resource("/{id}/profile")
                            .route(web::get().to(user::get_profile))
                            .route(web::put().to(user::update_profile)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(user::get_user))),
            )
            .service(
                web::scope("/settings").service(
                    web::resource("/company")
                        .route(web::get().to(settings::get_company))
                        .route(web::put().to(settings::update_company)),
                ),
            ),
    );
}
