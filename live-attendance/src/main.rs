use diesel::{
    MysqlConnection,
    r2d2::{ConnectionManager, Pool},
};
use dotenvy::dotenv;
use env_logger::Env;
use live_attendance::{
    attendance_session::coordinator::AttendanceSession,
    config::Config,
    http::{self, AppState},
    persistence::{PersistenceBridge, mysql_bridge::MysqlBridge},
    realtime::gateway::Gateway,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("trace")).init();
    let config = Config::from_env().expect("Could not load configuration");

    let manager = ConnectionManager::<MysqlConnection>::new(&config.database_url);
    let pool = Pool::builder()
        .test_on_check_out(true)
        .build(manager)
        .expect("Could not build connection pool");

    let session = Arc::new(AttendanceSession::new());
    let bridge: Arc<dyn PersistenceBridge> = Arc::new(MysqlBridge::new(pool.clone()));
    let jwt_secret = Arc::new(config.jwt_secret.clone());

    let gateway = Arc::new(Gateway::new(
        session.clone(),
        bridge.clone(),
        config.jwt_secret.clone(),
    ));

    let state = AppState {
        pool,
        session,
        bridge,
        jwt_secret,
        token_ttl: config.token_ttl,
    };

    let router = http::router(state, gateway, config.frontend_url.as_deref());
    http::listen(router, config.http_port)
        .await
        .expect("Could not serve HTTP");
}
