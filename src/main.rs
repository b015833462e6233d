mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let mongodb_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");

    log::info!("🚀 Starting Finance Service...");

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let db_data = web::Data::new(db);
    log::info!("✅ MongoDB connected successfully");

    // Aggregation-provider client and SMTP mailer, configured once and
    // injected into handlers (no globals).
    let plaid_data = web::Data::new(services::plaid_service::PlaidClient::from_env());
    let mailer = services::email_service::Mailer::from_env().expect("Invalid SMTP configuration");
    let mailer_data = web::Data::new(mailer);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!(
        "📚 Swagger UI available at: http://{}:{}/swagger-ui/",
        host,
        port
    );

    // Start HTTP server
    HttpServer::new(move || {
        let allowed_origins =
            env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);
        for origin in allowed_origins.split(',').filter(|o| !o.trim().is_empty()) {
            cors = cors.allowed_origin(origin.trim());
        }

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .app_data(plaid_data.clone())
            .app_data(mailer_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // API v1
            .service(
                web::scope("/v1")
                    // Public endpoints
                    .route("/signup", web::post().to(api::auth::signup))
                    .route("/login", web::post().to(api::auth::login))
                    .route(
                        "/addEarlyAccessUser",
                        web::post().to(api::early_access::add_early_access_user),
                    )
                    // Protected endpoints requiring JWT authentication
                    .service(
                        web::resource("/verify")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::auth::verify_account)),
                    )
                    .service(
                        web::resource("/verificationEmail")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::auth::verification_email)),
                    )
                    .service(
                        web::resource("/plaidLogin")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::post().to(api::plaid::plaid_login)),
                    )
                    .service(
                        web::resource("/test")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route(web::get().to(api::health::hello)),
                    )
                    .service(
                        web::scope("/dashboard")
                            .wrap(middleware::auth::AuthMiddleware)
                            .route("/status", web::post().to(api::dashboard::status))
                            .route("/income", web::post().to(api::dashboard::income))
                            .route("/netpay", web::post().to(api::dashboard::net_pay_summary))
                            .route("/deductions", web::post().to(api::dashboard::deductions))
                            .route("/expenses", web::post().to(api::dashboard::expenses)),
                    ),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
