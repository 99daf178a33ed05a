// crates/server/src/routes/home.rs
//! Browser landing page: one visit kicks off a collection job and the page
//! polls the download path until the archive exists, then redirects to it.

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use logpack_core::Job;

use crate::collector;
use crate::state::AppState;

/// Page template; `{file_name}` is the artifact base name of the job the
/// visit created.
const LANDING_PAGE: &str = r#"<html>
  <head>
    <title>Host Logs Collector</title>
    <script type="text/javascript">
      var archiveUrl = "./static/logs/{file_name}.zip";

      function pollForArchive() {
          var timer = setInterval(function () {
              var request = new XMLHttpRequest();
              request.open('HEAD', archiveUrl, true);
              request.onreadystatechange = function () {
                  if (request.readyState === 4 && request.status === 200) {
                      clearInterval(timer);
                      window.location.replace(archiveUrl);
                  }
              };
              request.send();
          }, 1000);
      }

      window.addEventListener("load", pollForArchive, false);
    </script>
  </head>
  <body>
    <h1>Host Logs Collector</h1>
    <p>Please wait while the logs are being collected, this can take a few minutes.</p>
    <p>Once ready, the download will start automatically.</p>
    <p>The archive will be available <a href="./static/logs/{file_name}.zip">here</a>.</p>
  </body>
</html>
"#;

fn render_landing_page(file_name: &str) -> String {
    LANDING_PAGE.replace("{file_name}", file_name)
}

/// GET / - Create a job and render the auto-polling page for it.
async fn home_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let job = Job::new();
    tracing::info!(job_id = %job.id, file = %job.file_name, "landing page triggered log collection");

    state.registry.insert(job.clone());
    collector::spawn_collection(state, &job);

    Html(render_landing_page(&job.file_name))
}

/// Build the landing page router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home_page))
}
