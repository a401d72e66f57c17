mod classifier;
mod error;
mod handlers;
mod page;

use std::path::Path;

use actix_files::Files;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use log::info;

use crate::classifier::StageModel;
use crate::handlers::AppState;

const UPLOAD_DIR: &str = "static";
const MODEL_PATH: &str = "model/best_model.onnx";
const BIND_ADDR: &str = "127.0.0.1:8080";

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    std::fs::create_dir_all(UPLOAD_DIR)
        .with_context(|| format!("could not create upload directory '{}'", UPLOAD_DIR))?;

    // The model must be fully loaded before the server accepts requests.
    let model = StageModel::load(Path::new(MODEL_PATH))
        .with_context(|| format!("could not load model weights from '{}'", MODEL_PATH))?;
    let state = web::Data::new(AppState {
        classifier: Box::new(model),
        upload_dir: UPLOAD_DIR.to_owned(),
    });

    info!("server running at http://{}", BIND_ADDR);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .service(
                web::resource("/")
                    .route(web::get().to(handlers::index))
                    .route(web::post().to(handlers::predict)),
            )
            .service(Files::new(&format!("/{}", UPLOAD_DIR), UPLOAD_DIR))
    })
    .bind(BIND_ADDR)
    .with_context(|| format!("could not bind {}", BIND_ADDR))?
    .run()
    .await?;

    Ok(())
}
