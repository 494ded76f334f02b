use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    config::CatalogConfig,
    models::{Car, Tour},
};

/// Events emitted by the background catalog fetch.
#[derive(Debug)]
pub enum CatalogEvent {
    /// Both collections were fetched.
    Loaded {
        cars: Vec<Car>,
        tours: Vec<Tour>,
    },
    /// Fetch failed; the caller keeps whatever it already shows.
    Error(anyhow::Error),
}

/// Fetches the catalog from the configured backend.
pub struct CatalogSync {
    base_url: String,
    client: reqwest::Client,
}

impl CatalogSync {
    /// `None` when no backend is configured.
    pub fn new(config: &CatalogConfig) -> Result<Option<Self>> {
        let Some(api_url) = config.api_url.as_deref().map(str::trim) else {
            return Ok(None);
        };
        if api_url.is_empty() {
            return Ok(None);
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Some(Self {
            base_url: api_url.trim_end_matches('/').to_string(),
            client,
        }))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch cars and tours, sending exactly one event to `sender`.
    pub async fn run(self, sender: mpsc::Sender<CatalogEvent>) -> Result<()> {
        let event = match self.fetch().await {
            Ok((cars, tours)) => {
                info!(
                    cars = cars.len(),
                    tours = tours.len(),
                    url = %self.base_url,
                    "Catalog fetched"
                );
                CatalogEvent::Loaded { cars, tours }
            }
            Err(err) => {
                warn!(?err, url = %self.base_url, "Catalog fetch failed");
                CatalogEvent::Error(err)
            }
        };
        sender
            .send(event)
            .await
            .context("failed to send catalog event")?;
        Ok(())
    }

    /// Fetch both collections concurrently.
    pub async fn fetch(&self) -> Result<(Vec<Car>, Vec<Tour>)> {
        tokio::try_join!(self.get_json("cars"), self.get_json("tours"))
    }

    async fn get_json<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let url = format!("{}/api/{collection}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?
            .error_for_status()
            .with_context(|| format!("{url} returned an error status"))?;
        let records: Vec<Value> = response
            .json()
            .await
            .with_context(|| format!("failed to decode {collection} from {url}"))?;
        Ok(decode_records(collection, records))
    }
}

/// Decode each record on its own, dropping the ones that do not fit.
fn decode_records<T: DeserializeOwned>(collection: &str, records: Vec<Value>) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(%err, collection, index, "Skipping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const CARS: &str = r#"[
        {"_id":"c1","brand":"Toyota","model":"Vios","pricePerDay":1800},
        {"_id":"c2","brand":"Honda","model":"City","price":2500,"pricePerDay":2400},
        {"_id":"c3","model":"No brand"}
    ]"#;
    const TOURS: &str = r#"[{"_id":"t1","title":"Bohol","price":8500,"isAvailable":true}]"#;

    async fn serve(listener: TcpListener) {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = vec![0u8; 4096];
            let Ok(read) = stream.read(&mut buf).await else {
                continue;
            };
            let request = String::from_utf8_lossy(&buf[..read]);
            let (status, body) = if request.starts_with("GET /api/cars ") {
                ("200 OK", CARS)
            } else if request.starts_with("GET /api/tours ") {
                ("200 OK", TOURS)
            } else {
                ("404 Not Found", "[]")
            };
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    }

    fn config(api_url: Option<String>) -> CatalogConfig {
        CatalogConfig {
            api_url,
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn missing_url_disables_sync() -> Result<()> {
        assert!(CatalogSync::new(&config(None))?.is_none());
        assert!(CatalogSync::new(&config(Some("  ".into())))?.is_none());
        let sync = CatalogSync::new(&config(Some("http://localhost:5000/".into())))?;
        assert_eq!(
            sync.as_ref().map(CatalogSync::base_url),
            Some("http://localhost:5000")
        );
        Ok(())
    }

    #[tokio::test]
    async fn loads_both_collections() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        tokio::spawn(serve(listener));

        let sync = CatalogSync::new(&config(Some(url)))?.context("sync configured")?;
        let (tx, mut rx) = mpsc::channel(1);
        sync.run(tx).await?;

        match rx.recv().await {
            Some(CatalogEvent::Loaded { cars, tours }) => {
                assert_eq!(cars.len(), 2);
                assert_eq!(cars[0].price_per_day.as_deref(), Some("1800"));
                assert_eq!(cars[1].price(), 2500);
                assert_eq!(tours[0].id, "t1");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_reports_error() -> Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}", listener.local_addr()?);
        drop(listener);

        let sync = CatalogSync::new(&config(Some(url)))?.context("sync configured")?;
        let (tx, mut rx) = mpsc::channel(1);
        sync.run(tx).await?;
        assert!(matches!(rx.recv().await, Some(CatalogEvent::Error(_))));
        Ok(())
    }
}
