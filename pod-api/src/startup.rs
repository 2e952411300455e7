use std::{net::TcpListener, sync::Arc};

use actix_web::{App, HttpResponse, HttpServer, dev::Server, get, web};
use pod_config::shared::{IntoConnectOptions, PgConnectionConfig};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;

use crate::{
    config::ApiConfig,
    k8s::{K8sClient, http::HttpK8sClient},
    routes::{
        ErrorMessage,
        health_check::health_check,
        pods::{
            AllPod, PodEnvInfo, PodInfo, PodPortInfo, PodResponse, add_pod, delete_pod,
            find_all_pods, find_pod_by_id, update_pod,
        },
    },
    store::{PodStore, PostgresPodStore},
    sync::PodSynchronizer,
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: ApiConfig) -> Result<Self, anyhow::Error> {
        config.database.validate()?;
        let connection_pool = get_connection_pool(&config.database);

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        // Without a cluster there is nothing to synchronize to, so startup fails.
        let k8s_client: Arc<dyn K8sClient> = Arc::new(HttpK8sClient::new().await?);
        let store: Arc<dyn PodStore> = Arc::new(PostgresPodStore::new(connection_pool));

        let server = run(listener, store, k8s_client).await?;

        Ok(Self { port, server })
    }

    pub async fn migrate_database(config: PgConnectionConfig) -> Result<(), anyhow::Error> {
        config.validate()?;
        let connection_pool = get_connection_pool(&config);

        sqlx::migrate!("./migrations").run(&connection_pool).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(config: &PgConnectionConfig) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(config.with_db())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check::health_check,
        crate::routes::pods::add_pod,
        crate::routes::pods::delete_pod,
        crate::routes::pods::find_pod_by_id,
        crate::routes::pods::update_pod,
        crate::routes::pods::find_all_pods,
    ),
    components(schemas(PodInfo, PodPortInfo, PodEnvInfo, PodResponse, AllPod, ErrorMessage))
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
async fn openapi_json(openapi: web::Data<utoipa::openapi::OpenApi>) -> HttpResponse {
    HttpResponse::Ok().json(openapi.get_ref())
}

/// Starts the HTTP server on `listener`.
///
/// The store and cluster client are shared by every worker; routes receive
/// them, and the [`PodSynchronizer`] built from them, through actix `Data`.
pub async fn run(
    listener: TcpListener,
    store: Arc<dyn PodStore>,
    k8s_client: Arc<dyn K8sClient>,
) -> Result<Server, anyhow::Error> {
    let synchronizer = web::Data::new(PodSynchronizer::new(k8s_client, store.clone()));
    let store: web::Data<dyn PodStore> = store.into();
    let openapi = web::Data::new(ApiDoc::openapi());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .service(health_check)
            .service(openapi_json)
            .service(
                web::scope("v1")
                    .service(add_pod)
                    .service(delete_pod)
                    .service(find_pod_by_id)
                    .service(update_pod)
                    .service(find_all_pods),
            )
            .app_data(synchronizer.clone())
            .app_data(store.clone())
            .app_data(openapi.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
