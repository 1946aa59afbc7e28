#![allow(dead_code, clippy::similar_names)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
mod flight_control;
mod logger;
mod vehicle_link;

use crate::logger::SessionLog;
use crate::vehicle_link::{LinkConfig, sim_link};
use tokio::net::TcpStream;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() {
    let config = LinkConfig::from_env();
    info!("connecting to vehicle link at {}", config.addr());
    let stream = match TcpStream::connect(config.addr()).await {
        Ok(s) => s,
        Err(e) => fatal!("no connection to vehicle link at {}: {e}", config.addr()),
    };
    let nav_log = match SessionLog::open() {
        Ok(l) => l,
        Err(e) => fatal!("could not open session log: {e}"),
    };
    info!("session log at {}", nav_log.path().display());

    let threaded = config.threaded();
    let run = sim_link::run_mission(stream, config, nav_log);
    let result = if threaded {
        match tokio::spawn(run).await {
            Ok(res) => res,
            Err(e) => fatal!("mission task panicked: {e}"),
        }
    } else {
        run.await
    };
    match result {
        Ok(()) => info!("mission complete, control returned to manual"),
        Err(e) => fatal!("mission aborted: {e}"),
    }
}
