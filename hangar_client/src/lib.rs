use models;

use reqwest::{header, Url};

use anyhow::anyhow;
use log::*;

const DEFAULT_TEAM: &str = "main";

pub trait ClientConfig {
    fn api_url(&self) -> Option<&str>;
    fn team(&self) -> Option<&str>;
    fn token(&self) -> Option<&models::Token>;
    fn insecure(&self) -> bool;
}

fn call_api<C: ClientConfig>(config: &C) -> Result<reqwest::Client, anyhow::Error> {
    let mut headers = header::HeaderMap::new();

    if let Some(token) = config.token() {
        let mut auth_value =
            header::HeaderValue::from_str(&format!("{} {}", token.token_type, token.value))?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);
    }

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(config.insecure())
        .build()?)
}

fn endpoint<C: ClientConfig>(config: &C, segments: &[&str]) -> Result<Url, anyhow::Error> {
    let api_url = config
        .api_url()
        .ok_or_else(|| anyhow!("api_url is not set"))?;
    let mut url = Url::parse(api_url)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("api_url {} can not be a base", api_url))?
        .pop_if_empty()
        .extend(["api", "v1"])
        .extend(segments);
    Ok(url)
}

pub fn get<C: ClientConfig>(
    config: &C,
    segments: &[&str],
) -> Result<reqwest::RequestBuilder, anyhow::Error> {
    let url = endpoint(config, segments)?;
    debug!("GET {}", url);
    Ok(call_api(config)?.get(url))
}

pub fn get_query<C: ClientConfig, T: serde::Serialize>(
    config: &C,
    segments: &[&str],
    query: &T,
) -> Result<reqwest::RequestBuilder, anyhow::Error> {
    let url = endpoint(config, segments)?;
    debug!("GET {}", url);
    Ok(call_api(config)?.get(url).query(query))
}

pub async fn json<T: for<'a> serde::Deserialize<'a>>(
    response: reqwest::Result<reqwest::Response>,
) -> Result<T, anyhow::Error> {
    match response {
        Ok(response) => {
            info!("Get reponse with status {:?}", response.status());
            if response.status().is_success() {
                Ok(response.json().await?)
            } else {
                Err(error_from(response).await)
            }
        }
        Err(err) => Err(err.into()),
    }
}

async fn error_from(response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => return err.into(),
    };
    match serde_json::from_str::<models::ErrorResponse>(&text) {
        Ok(error_response) => anyhow!("{}", error_response.message),
        Err(err) => anyhow!(
            "Failed to parse response as json ({}). Got {}: {}",
            err,
            status,
            text
        ),
    }
}

/// Parses an RFC 8288 `Link` header into previous/next pages.
/// Entries that are malformed or have another rel are skipped.
pub fn parse_link_header(value: &str) -> models::Pagination {
    let mut pagination = models::Pagination::default();

    for link in value.split(',') {
        let mut parts = link.split(';');
        let target = parts
            .next()
            .map(str::trim)
            .and_then(|target| target.strip_prefix('<'))
            .and_then(|target| target.strip_suffix('>'));
        let Some(target) = target else {
            debug!("Skipping malformed link {:?}", link);
            continue;
        };

        let rel = parts
            .filter_map(|param| param.trim().strip_prefix("rel="))
            .map(|rel| rel.trim_matches('"'))
            .next();

        let Some(page) = page_from_link(target) else {
            debug!("Skipping link with invalid target {:?}", target);
            continue;
        };

        match rel {
            Some("previous") => pagination.previous = Some(page),
            Some("next") => pagination.next = Some(page),
            _ => {}
        }
    }

    pagination
}

fn page_from_link(target: &str) -> Option<models::Page> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => Url::parse("http://localhost").ok()?.join(target).ok()?,
    };

    let mut page = models::Page::default();
    for (key, value) in url.query_pairs() {
        let field = match &*key {
            "since" => &mut page.since,
            "until" => &mut page.until,
            "limit" => &mut page.limit,
            _ => continue,
        };
        *field = value.parse().ok()?;
    }
    Some(page)
}

pub mod api {
    use crate::ClientConfig;

    use reqwest::{header, StatusCode};

    use log::*;

    pub async fn all_builds<C: ClientConfig>(
        config: &C,
    ) -> Result<Vec<models::Build>, anyhow::Error> {
        let response = super::get(config, &["builds"])?.send().await;
        super::json(response).await
    }

    /// Returns the builds of a job together with the pagination links and
    /// whether the pipeline/job exists at all.
    pub async fn job_builds<C: ClientConfig>(
        config: &C,
        pipeline: &str,
        job: &str,
        page: models::Page,
    ) -> Result<(Vec<models::Build>, models::Pagination, bool), anyhow::Error> {
        let team = config.team().unwrap_or(super::DEFAULT_TEAM);
        let segments = [
            "teams",
            team,
            "pipelines",
            pipeline,
            "jobs",
            job,
            "builds",
        ];
        let response = super::get_query(config, &segments, &page)?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Job {}/{} not found in team {}", pipeline, job, team);
            return Ok((Vec::new(), models::Pagination::default(), false));
        }

        let pagination = response
            .headers()
            .get(header::LINK)
            .and_then(|value| value.to_str().ok())
            .map(super::parse_link_header)
            .unwrap_or_default();

        let builds = super::json(Ok(response)).await?;
        Ok((builds, pagination, true))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use warp::Filter;

    use super::*;

    #[derive(Default)]
    struct TestConfig {
        api_url: Option<String>,
        team: Option<String>,
        token: Option<models::Token>,
    }

    impl ClientConfig for TestConfig {
        fn api_url(&self) -> Option<&str> {
            self.api_url.as_deref()
        }

        fn team(&self) -> Option<&str> {
            self.team.as_deref()
        }

        fn token(&self) -> Option<&models::Token> {
            self.token.as_ref()
        }

        fn insecure(&self) -> bool {
            false
        }
    }

    fn test_config(addr: std::net::SocketAddr) -> TestConfig {
        TestConfig {
            api_url: Some(format!("http://{}", addr)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_all_builds() -> Result<(), anyhow::Error> {
        let routes = warp::path!("api" / "v1" / "builds")
            .and(warp::get())
            .map(|| {
                warp::reply::json(&serde_json::json!([
                    {"id": 2, "name": "5", "status": "started", "pipeline_name": "p", "job_name": "j"},
                    {"id": 1, "status": "succeeded"}
                ]))
            });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let builds = api::all_builds(&test_config(addr)).await?;

        assert_eq!(builds.len(), 2);
        assert_eq!(builds[0].id, 2);
        assert_eq!(builds[0].status, models::BuildStatus::Started);
        assert_eq!(builds[1].status, models::BuildStatus::Succeeded);
        assert!(builds[1].pipeline_name.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_job_builds() -> Result<(), anyhow::Error> {
        let routes = warp::path!(
            "api" / "v1" / "teams" / String / "pipelines" / String / "jobs" / String / "builds"
        )
        .and(warp::get())
        .and(warp::header::exact("authorization", "Bearer secret"))
        .and(warp::query::<HashMap<String, String>>())
        .map(
            |team: String, pipeline: String, job: String, query: HashMap<String, String>| {
                let limit = query.get("limit").cloned().unwrap_or_default();
                let builds = serde_json::json!([{
                    "id": 10,
                    "team_name": team,
                    "name": limit,
                    "status": "failed",
                    "pipeline_name": pipeline,
                    "job_name": job,
                }]);
                warp::reply::with_header(
                    warp::reply::json(&builds),
                    "link",
                    "</api/v1/teams/ops/pipelines/deploy/jobs/prod/builds?until=10&limit=3>; rel=\"next\"",
                )
            },
        );
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let config = TestConfig {
            team: Some("ops".to_string()),
            token: Some(models::Token {
                token_type: "Bearer".to_string(),
                value: "secret".to_string(),
            }),
            ..test_config(addr)
        };
        let page = models::Page {
            limit: 3,
            ..Default::default()
        };
        let (builds, pagination, found) = api::job_builds(&config, "deploy", "prod", page).await?;

        assert!(found);
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0].team_name, "ops");
        assert_eq!(builds[0].pipeline_name, "deploy");
        assert_eq!(builds[0].job_name, "prod");
        assert_eq!(builds[0].name, "3");
        assert_eq!(builds[0].status, models::BuildStatus::Failed);
        assert_eq!(pagination.previous, None);
        assert_eq!(
            pagination.next,
            Some(models::Page {
                since: 0,
                until: 10,
                limit: 3
            })
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_job_builds_not_found() -> Result<(), anyhow::Error> {
        let routes = warp::path!("api" / "v1" / "builds").map(warp::reply);
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let (builds, pagination, found) =
            api::job_builds(&test_config(addr), "missing", "job", models::Page::default())
                .await?;

        assert!(!found);
        assert!(builds.is_empty());
        assert_eq!(pagination, models::Pagination::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_error_message_from_body() {
        let routes = warp::path!("api" / "v1" / "builds").map(|| {
            warp::reply::with_status(
                warp::reply::json(&serde_json::json!({"message": "database is down"})),
                warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            )
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = api::all_builds(&test_config(addr)).await.unwrap_err();
        assert_eq!(err.to_string(), "database is down");
    }

    #[tokio::test]
    async fn test_error_with_plain_body() {
        let routes = warp::path!("api" / "v1" / "builds").map(|| {
            warp::reply::with_status("upstream closed", warp::http::StatusCode::BAD_GATEWAY)
        });
        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let err = api::all_builds(&test_config(addr)).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to parse response as json"));
        assert!(message.contains("502"));
        assert!(message.ends_with("upstream closed"));
    }

    #[tokio::test]
    async fn test_missing_api_url() {
        let err = api::all_builds(&TestConfig::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "api_url is not set");
    }

    #[test]
    fn test_endpoint_keeps_base_path() -> Result<(), anyhow::Error> {
        let config = TestConfig {
            api_url: Some("https://ci.example.com/concourse/".to_string()),
            ..Default::default()
        };
        let url = endpoint(&config, &["teams", "main", "pipelines", "a b", "jobs", "c"])?;
        assert_eq!(
            url.as_str(),
            "https://ci.example.com/concourse/api/v1/teams/main/pipelines/a%20b/jobs/c"
        );
        Ok(())
    }

    #[test]
    fn test_parse_link_header() {
        let pagination = parse_link_header(
            "<http://ci/api/v1/builds?since=12&limit=2>; rel=\"previous\", \
             <http://ci/api/v1/builds?until=9&limit=2>; rel=\"next\"",
        );
        assert_eq!(
            pagination.previous,
            Some(models::Page {
                since: 12,
                until: 0,
                limit: 2
            })
        );
        assert_eq!(
            pagination.next,
            Some(models::Page {
                since: 0,
                until: 9,
                limit: 2
            })
        );
    }

    #[test]
    fn test_parse_link_header_ignores_garbage() {
        let pagination =
            parse_link_header("nonsense, </builds?limit=x>; rel=\"next\", </b?limit=1>; rel=\"self\"");
        assert_eq!(pagination, models::Pagination::default());
    }
}
