use actix_web::{web, App, HttpServer};
use fare_friend::api::{self, AppState};
use fare_friend::middlewares::RequestLogger;
use fare_friend::AppConfig;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Inicializar el sistema de logging (también recoge los registros de `log`)
    tracing_subscriber::fmt::init();

    // Cargar configuración (.env + config.toml)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error al cargar la configuración: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("Error al inicializar el servicio: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    let bind = (config.server.host.clone(), config.server.port);
    info!("FareFriend escuchando en http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(state.clone())
            .configure(api::config)
    })
    .bind(bind)?
    .run()
    .await
}
