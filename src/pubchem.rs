//! [Home page](https://pubchem.ncbi.nlm.nih.gov/)
//! [API docs](https://pubchem.ncbi.nlm.nih.gov/docs/pug-rest)
//!
//! Compound page links, and 3D structure (SDF) downloads.

use std::time::Duration;

use ureq::Agent;

use crate::{HTTP_TIMEOUT, ReqError, make_agent};

pub const BASE_COMPOUND_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/compound";

pub const BASE_PUG_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// The compound's public PubChem page. The id is embedded as-is.
pub fn compound_url(cid: &str) -> String {
    format!("{BASE_COMPOUND_URL}/{cid}")
}

pub fn open_overview(cid: &str) {
    if let Err(e) = webbrowser::open(&compound_url(cid)) {
        log::error!("Failed to open the web browser: {e:?}");
    }
}

/// A PubChem PUG REST client. Each request is bounded by the client's timeout, and is
/// made once: there are no retries.
#[derive(Clone)]
pub struct Client {
    agent: Agent,
    pug_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Duration::from_secs(HTTP_TIMEOUT))
    }
}

impl Client {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: make_agent(timeout),
            pug_url: BASE_PUG_URL.to_owned(),
        }
    }

    /// Use a different PUG REST base, e.g. a mirror or a local test server.
    pub fn with_pug_url(mut self, url: impl Into<String>) -> Self {
        self.pug_url = url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn sdf_url(&self, cid: &str) -> String {
        format!(
            "{}/compound/cid/{cid}/record/SDF/?record_type=3d&response_type=save",
            self.pug_url
        )
    }

    /// Download the 3D conformer of a compound, as SDF bytes.
    pub fn load_sdf(&self, cid: &str) -> Result<Vec<u8>, ReqError> {
        // Catch HTTP != 2xx explicitly; otherwise an error page would come back as the SDF.
        let mut resp = self.agent.get(self.sdf_url(cid)).call()?;
        if !resp.status().is_success() {
            return Err(ReqError::Status(resp.status().as_u16()));
        }

        let body = resp.body_mut().read_to_vec()?;
        if body.is_empty() {
            return Err(ReqError::EmptyBody);
        }
        Ok(body)
    }

    /// Like [`Self::load_sdf`], but any failure is logged and reported as `None`.
    pub fn fetch_3d_structure(&self, cid: &str) -> Option<Vec<u8>> {
        match self.load_sdf(cid) {
            Ok(sdf) => {
                log::info!("Fetched 3D structure for CID {cid}: {} bytes", sdf.len());
                Some(sdf)
            }
            Err(e) => {
                log::warn!("No 3D structure for CID {cid}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_page() {
        assert_eq!(
            compound_url("3345"),
            "https://pubchem.ncbi.nlm.nih.gov/compound/3345"
        );
        // Not validated or escaped.
        assert_eq!(
            compound_url("abc"),
            "https://pubchem.ncbi.nlm.nih.gov/compound/abc"
        );
    }

    #[test]
    fn sdf_endpoint() {
        assert_eq!(
            Client::default().sdf_url("5288826"),
            "https://pubchem.ncbi.nlm.nih.gov/rest/pug/compound/cid/5288826/record/SDF/?record_type=3d&response_type=save"
        );
    }

    #[test]
    fn custom_base_drops_trailing_slash() {
        let client = Client::default().with_pug_url("http://127.0.0.1:9/");
        assert_eq!(
            client.sdf_url("1"),
            "http://127.0.0.1:9/compound/cid/1/record/SDF/?record_type=3d&response_type=save"
        );
    }
}
