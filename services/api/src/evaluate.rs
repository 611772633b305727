use crate::infra::{build_service, config_manager};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use trust_score::config::AppConfig;
use trust_score::error::AppError;
use trust_score::evaluation::{Evaluation, VideoId};
use trust_score::metrics::CsvMetricsCatalog;

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// CSV metrics catalog to read the video from
    #[arg(long)]
    pub(crate) catalog: PathBuf,
    /// Identifier of the video to evaluate
    #[arg(long)]
    pub(crate) video_id: String,
    /// Print the evaluation as JSON instead of a text breakdown
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let EvaluateArgs {
        catalog,
        video_id,
        json,
    } = args;

    let config = AppConfig::load()?;
    let catalog = CsvMetricsCatalog::from_path(&catalog)?;
    let service = build_service(&config.storage, Arc::new(catalog))?;

    let video_id = VideoId(video_id);
    let evaluation = service.evaluate_video(&video_id)?;

    if json {
        let encoded = serde_json::to_string_pretty(&evaluation).map_err(std::io::Error::from)?;
        println!("{encoded}");
    } else {
        print!("{}", render_evaluation(&video_id, &evaluation));
    }
    Ok(())
}

pub(crate) fn run_config_show() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let manager = config_manager(&config.storage)?;
    let (version, active) = manager.active_snapshot();

    let encoded = serde_json::to_string_pretty(&active).map_err(std::io::Error::from)?;
    println!("# config version {version}");
    println!("{encoded}");
    Ok(())
}

pub(crate) fn render_evaluation(video_id: &VideoId, evaluation: &Evaluation) -> String {
    let source = &evaluation.breakdown.source;
    let content = &evaluation.breakdown.content;
    let mut out = String::new();

    let _ = writeln!(out, "Video {video_id}");
    let _ = writeln!(
        out,
        "Grade {} ({}), total {:.3}",
        evaluation.grade, evaluation.grade_description, evaluation.total_score
    );
    if let Some(version) = evaluation.config_version {
        let _ = writeln!(out, "Config version {version}");
    }

    let _ = writeln!(out, "\nSource {:.3}", evaluation.source_score);
    let _ = writeln!(
        out,
        "  subscribers  {:>12} -> {:.2}",
        source.subscribers.count, source.subscribers.score
    );
    let _ = writeln!(
        out,
        "  activity     {:>7} days -> {:.2}",
        source.activity.days, source.activity.score
    );
    let _ = writeln!(
        out,
        "  engagement   likes/view {:.4}, comments/view {:.4} -> {:.2}",
        source.engagement.like_ratio, source.engagement.comment_ratio, source.engagement.score
    );

    let _ = writeln!(out, "\nContent {:.3}", evaluation.content_score);
    let _ = writeln!(
        out,
        "  title        {} chars, required keyword {}, suspicious keyword {} -> {:.2}",
        content.title.length,
        yes_no(content.title.has_required_keyword),
        yes_no(content.title.has_suspicious_keyword),
        content.title.score
    );
    let domains = if content.description.quality_domains.is_empty() {
        "none".to_string()
    } else {
        content.description.quality_domains.join(", ")
    };
    let _ = writeln!(
        out,
        "  description  {} chars, {} links, quality domains {} -> {:.2}",
        content.description.length, content.description.link_count, domains, content.description.score
    );
    let _ = writeln!(
        out,
        "  sentiment    {:+.1} -> {:.2}",
        content.sentiment.value, content.sentiment.score
    );

    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use trust_score::evaluation::{EvaluationEngine, ScoringConfig, VideoMetrics};

    #[test]
    fn breakdown_lists_every_factor() {
        let now = Utc
            .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let metrics = VideoMetrics {
            subscriber_count: 250_000,
            published_at: now - Duration::days(100),
            view_count: 4_000,
            like_count: 320,
            comment_count: 40,
            title: "연구 결과 100% 확실".to_string(),
            description: "자료 출처 https://stats.example.gov/report".to_string(),
        };
        let evaluation = EvaluationEngine::new(ScoringConfig::default()).evaluate(&metrics, now);

        let rendered = render_evaluation(&VideoId("kx81".to_string()), &evaluation);

        assert!(rendered.starts_with("Video kx81\n"));
        assert!(rendered.contains("required keyword yes, suspicious keyword yes -> 0.89"));
        assert!(rendered.contains("1 links, quality domains .gov"));
        assert!(rendered.contains("activity         100 days -> 0.60"));
        assert!(!rendered.contains("Config version"));
    }
}
