use super::*;

// Retries transport failures only; typed failures surface immediately.
pub(super) fn with_retries<T>(
    label: &str,
    mut f: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    const ATTEMPTS: usize = 3;
    let mut last: Option<StoreError> = None;
    for i in 0..ATTEMPTS {
        match f() {
            Ok(v) => return Ok(v),
            Err(StoreError::Transport(err)) => {
                last = Some(StoreError::Transport(format!("{}: {}", label, err)));
                if i + 1 < ATTEMPTS {
                    std::thread::sleep(std::time::Duration::from_millis(200 * (1 << i)));
                }
            }
            Err(err) => return Err(err),
        }
    }
    Err(last.unwrap_or_else(|| StoreError::Transport(label.to_string())))
}

impl GitHubStore {
    pub(super) fn ensure_ok(
        &self,
        resp: reqwest::blocking::Response,
        label: &str,
    ) -> Result<reqwest::blocking::Response, StoreError> {
        match resp.status() {
            reqwest::StatusCode::UNAUTHORIZED => Err(StoreError::Transport(format!(
                "{}: unauthorized (token invalid/expired)",
                label
            ))),
            reqwest::StatusCode::FORBIDDEN => Err(StoreError::Transport(format!(
                "{}: forbidden (check repo permissions)",
                label
            ))),
            reqwest::StatusCode::NOT_FOUND => Err(StoreError::NotFound(label.to_string())),
            reqwest::StatusCode::CONFLICT | reqwest::StatusCode::UNPROCESSABLE_ENTITY => {
                let detail = resp.text().unwrap_or_default();
                Err(StoreError::Conflict(format!("{}: {}", label, detail)))
            }
            _ => resp
                .error_for_status()
                .map_err(|err| StoreError::Transport(format!("{}: {}", label, err))),
        }
    }

    pub(super) fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub(super) fn url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.base_url, self.repo.owner, self.repo.name, path
        )
    }
}
