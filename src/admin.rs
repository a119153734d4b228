//! Admin channel: newline-terminated commands on standard input.
//!
//! `RESET` wipes the store and then behaves as `SHUTDOWN`. `SHUTDOWN`
//! stops the accept loop; already-connected sessions are not torn down
//! here. EOF on stdin ends the task without shutting the server down.

use crate::state::Hub;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

/// Spawn the stdin reader task.
pub fn spawn(hub: Arc<Hub>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            match line.trim() {
                "RESET" => {
                    match hub.store.delete_everything().await {
                        Ok(()) => info!("Store wiped by admin"),
                        Err(e) => error!(error = %e, "Reset failed"),
                    }
                    hub.shutdown();
                    break;
                }
                "SHUTDOWN" => {
                    info!("Shutdown requested by admin");
                    hub.shutdown();
                    break;
                }
                "" => {}
                other => warn!(command = %other, "Unknown admin command"),
            }
        }
    });
}
