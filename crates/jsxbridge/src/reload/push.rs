use super::{Delivery, DeliveryError, ReloadPayload, ReloadTransport};
use async_trait::async_trait;

/// POSTs `{"jsx": <bootstrap>}` to a companion extension running inside the host.
#[derive(Debug, Clone)]
pub struct NetworkPush {
    host: String,
    port: u16,
}

impl NetworkPush {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }

    fn unreachable(&self, reason: impl ToString) -> DeliveryError {
        DeliveryError::Unreachable {
            host: self.host.clone(),
            port: self.port,
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl ReloadTransport for NetworkPush {
    async fn deliver(&self, payload: &ReloadPayload) -> Result<Delivery, DeliveryError> {
        let url = self.url();
        let body = serde_json::json!({ "jsx": payload.bootstrap }).to_string();

        let result = tokio::task::spawn_blocking(move || -> Result<String, ureq::Error> {
            let mut resp = ureq::post(&url)
                .content_type("application/json")
                .send(&body)?;
            resp.body_mut().read_to_string()
        })
        .await
        .map_err(|e| self.unreachable(format!("push task failed: {}", e)))?;

        match result {
            Ok(text) => Ok(Delivery {
                output: (!text.trim().is_empty()).then(|| text.trim().to_string()),
            }),
            Err(ureq::Error::StatusCode(status)) => Err(DeliveryError::Rejected {
                host: self.host.clone(),
                port: self.port,
                status,
            }),
            Err(e) => Err(self.unreachable(e)),
        }
    }

    fn describe(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::ErrorChannel;

    #[tokio::test]
    async fn test_closed_port_is_unreachable() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let push = NetworkPush::new("127.0.0.1", port);
        let payload = ReloadPayload::new("/tmp/a.jsx", ErrorChannel::Console);

        match push.deliver(&payload).await {
            Err(DeliveryError::Unreachable { host, port: p, .. }) => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(p, port);
            }
            other => panic!("expected unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_url() {
        let push = NetworkPush::new("localhost", 8090);
        assert_eq!(push.url(), "http://localhost:8090/");
        assert_eq!(push.describe(), "http://localhost:8090");
    }
}
