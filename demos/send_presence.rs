//! Send one arrival event to the presence API.
//!
//! Reads credentials from CALVEN_API_KEY and CALVEN_API_SECRET, and the
//! optional CALVEN_API_BASE and CALVEN_CORRELATION_ID.

use calven_rs::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let calven = from_env()?;
    let presence = calven.presence()?;

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis() as i64;
    let events = vec![PresenceEvent::new("arrival", now).with_attribute("userId", "demo-user")];

    match presence.send_presence("demo-source", events).await {
        Ok(response) => println!("Accepted: {}", serde_json::to_string_pretty(&response)?),
        Err(e) if e.status().is_some() => {
            eprintln!("Calven rejected the request with status {:?}: {}", e.status(), e)
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
