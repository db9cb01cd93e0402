//! HTTP Planner Client - 调用外部编曲规划服务
//!
//! 将自然语言描述发给规划服务，解析其返回的 JSON 歌单

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{MixPlannerPort, PlanError};
use crate::domain::mix::{MixPlan, PlannedClip, TimeWindow};

/// 规划服务请求体
#[derive(Debug, Serialize)]
struct PlanRequest<'a> {
    prompt: &'a str,
}

/// 规划服务返回的歌单（wire 格式）
#[derive(Debug, Deserialize)]
struct PlanResponse {
    #[serde(rename = "mixTitle")]
    mix_title: String,
    songs: Vec<PlannedSong>,
}

#[derive(Debug, Deserialize)]
struct PlannedSong {
    title: String,
    artist: String,
    #[serde(rename = "startTime")]
    start_time: String,
    #[serde(rename = "endTime")]
    end_time: String,
}

/// HTTP 规划客户端配置
#[derive(Debug, Clone)]
pub struct HttpPlannerConfig {
    /// 规划服务地址
    pub url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 失败重试次数
    pub max_retries: u32,
}

impl Default for HttpPlannerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8200".to_string(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

/// HTTP 规划客户端
pub struct HttpPlannerClient {
    client: reqwest::Client,
    config: HttpPlannerConfig,
}

impl HttpPlannerClient {
    pub fn new(config: HttpPlannerConfig) -> Result<Self, PlanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlanError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn plan_url(&self) -> String {
        format!("{}/api/plan", self.config.url.trim_end_matches('/'))
    }

    fn map_reqwest_error(e: reqwest::Error) -> PlanError {
        if e.is_timeout() {
            PlanError::Timeout
        } else {
            PlanError::NetworkError(e.to_string())
        }
    }

    /// 把 wire 歌单转换为领域的混音计划
    fn into_plan(response: PlanResponse) -> Result<MixPlan, PlanError> {
        let mut clips = Vec::with_capacity(response.songs.len());
        for song in response.songs {
            let window = TimeWindow::parse(&song.start_time, &song.end_time).map_err(|e| {
                PlanError::MalformedPlan(format!(
                    "Bad time window for '{}': {}",
                    song.title, e
                ))
            })?;
            clips.push(PlannedClip {
                title: song.title,
                artist: song.artist,
                window,
            });
        }
        Ok(MixPlan {
            title: response.mix_title,
            clips,
        })
    }

    async fn plan_once(&self, prompt: &str) -> Result<MixPlan, PlanError> {
        let response = self
            .client
            .post(self.plan_url())
            .json(&PlanRequest { prompt })
            .send()
            .await
            .map_err(Self::map_reqwest_error)?;

        if !response.status().is_success() {
            return Err(PlanError::ServiceError(format!(
                "Planner returned HTTP {}",
                response.status()
            )));
        }

        let body: PlanResponse = response
            .json()
            .await
            .map_err(|e| PlanError::MalformedPlan(format!("Invalid plan JSON: {}", e)))?;

        Self::into_plan(body)
    }
}

#[async_trait]
impl MixPlannerPort for HttpPlannerClient {
    async fn plan(&self, prompt: &str) -> Result<MixPlan, PlanError> {
        let mut last_error = PlanError::NetworkError("No attempt made".to_string());

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(attempt, "Retrying mix plan request");
            }
            match self.plan_once(prompt).await {
                Ok(plan) => {
                    tracing::info!(title = %plan.title, clips = plan.clips.len(), "Mix plan received");
                    return Ok(plan);
                }
                // 格式错误重试也不会变好
                Err(e @ PlanError::MalformedPlan(_)) => return Err(e),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_url_strips_trailing_slash() {
        let client = HttpPlannerClient::new(HttpPlannerConfig {
            url: "http://planner:8200/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.plan_url(), "http://planner:8200/api/plan");
    }

    #[test]
    fn test_parse_wire_plan() {
        let json = r#"{
            "mixTitle": "Late Night Drive",
            "songs": [
                {"title": "Song A", "artist": "Artist A", "startTime": "00:00:30", "endTime": "00:01:45"},
                {"title": "Song B", "artist": "Artist B", "startTime": "01:10", "endTime": "02:40"}
            ]
        }"#;
        let wire: PlanResponse = serde_json::from_str(json).unwrap();
        let plan = HttpPlannerClient::into_plan(wire).unwrap();

        assert_eq!(plan.title, "Late Night Drive");
        assert_eq!(plan.clips.len(), 2);
        assert_eq!(plan.clips[0].window.start_secs, 30);
        assert_eq!(plan.clips[0].window.end_secs, 105);
        assert_eq!(plan.clips[1].window.start_secs, 70);
        assert_eq!(plan.clips[1].window.end_secs, 160);
    }

    #[test]
    fn test_parse_rejects_bad_window() {
        let wire = PlanResponse {
            mix_title: "Broken".to_string(),
            songs: vec![PlannedSong {
                title: "Song".to_string(),
                artist: "Artist".to_string(),
                start_time: "02:00".to_string(),
                end_time: "01:00".to_string(),
            }],
        };
        let result = HttpPlannerClient::into_plan(wire);
        assert!(matches!(result, Err(PlanError::MalformedPlan(_))));
    }
}
