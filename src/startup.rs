use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::audience::Audience;
use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::routes::check_audience;
use crate::routes::health_check;
use crate::routes::join_mobile_waitlist;
use crate::routes::send_test_welcome_email;
use crate::routes::subscribe_to_newsletter;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the listener and build the email client from `cfg`. Port 0 picks a
    /// random free port, see `get_port`.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;
        let port = listener.local_addr()?.port();

        let email_client = cfg.email_client.client()?;
        let audience = cfg.email_client.audience();
        if audience.id().is_none() {
            tracing::warn!("No audience id configured; signups will not be added to an audience");
        }

        let server = run(listener, email_client, audience)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    audience: Audience,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc`; every worker shares the same client (and its
    // connection pool)
    let email_client = web::Data::new(email_client);
    let audience = web::Data::new(audience);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/mobile-waitlist", web::post().to(join_mobile_waitlist))
                    .route("/newsletter", web::post().to(subscribe_to_newsletter))
                    .route("/test-audience", web::get().to(check_audience))
                    .route("/test-audience", web::post().to(send_test_welcome_email)),
            )
            .app_data(email_client.clone())
            .app_data(audience.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
