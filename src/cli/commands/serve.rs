//! Serve command - redirect test server.

use crate::config::Settings;

/// Run the serve command. `bind` overrides `server.bind`.
pub async fn run(bind: Option<String>, config: &Settings) -> anyhow::Result<()> {
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());

    #[cfg(feature = "http-server")]
    {
        crate::http_server::serve(&bind).await
    }

    #[cfg(not(feature = "http-server"))]
    {
        anyhow::bail!("cannot serve on {bind}: built without the http-server feature")
    }
}
