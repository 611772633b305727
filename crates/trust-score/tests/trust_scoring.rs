use chrono::{DateTime, Duration, TimeZone, Utc};
use trust_score::evaluation::{
    aggregate, evaluate_content, evaluate_source, EvaluationEngine, Grade, ScoringConfig,
    VideoMetrics,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn metrics(title: &str, description: &str) -> VideoMetrics {
    VideoMetrics {
        subscriber_count: 500_000,
        published_at: now() - Duration::days(200),
        view_count: 20_000,
        like_count: 1_000,
        comment_count: 100,
        title: title.to_string(),
        description: description.to_string(),
    }
}

#[test]
fn short_title_with_mixed_keywords_scores_0_891() {
    let breakdown = evaluate_content(
        &metrics("연구 결과 100% 확실", ""),
        &ScoringConfig::default(),
    );

    assert!((breakdown.title.score - 0.891).abs() < 1e-9);
}

#[test]
fn medium_channel_scores_point_eight_on_subscribers() {
    let breakdown = evaluate_source(
        &metrics("주간 경제 브리핑", ""),
        &ScoringConfig::default(),
        now(),
    );

    assert_eq!(breakdown.subscribers.score, 0.8);
    assert_eq!(breakdown.activity.score, 0.8);
}

#[test]
fn aggregate_assigns_grade_bands() {
    let config = ScoringConfig::default();

    assert_eq!(aggregate(0.9, 0.85, &config).grade, Grade::A);
    assert_eq!(aggregate(0.7, 0.65, &config).grade, Grade::B);
    assert_eq!(aggregate(0.5, 0.45, &config).grade, Grade::C);
    assert_eq!(aggregate(0.3, 0.25, &config).grade, Grade::D);
    assert_eq!(aggregate(0.1, 0.05, &config).grade, Grade::F);
}

#[test]
fn scores_stay_in_unit_interval_for_extreme_inputs() {
    let engine = EvaluationEngine::new(ScoringConfig::default());
    let long_title = format!("{} 데이터 출처 연구", "가".repeat(120));
    let link_spam = (0..20)
        .map(|i| format!("https://site{i}.edu https://site{i}.gov"))
        .collect::<Vec<_>>()
        .join(" ");
    let cases = [
        VideoMetrics {
            subscriber_count: 0,
            published_at: now() + Duration::days(30),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            title: String::new(),
            description: String::new(),
        },
        VideoMetrics {
            subscriber_count: u64::MAX,
            published_at: now() - Duration::days(10_000),
            view_count: 1,
            like_count: u64::MAX,
            comment_count: u64::MAX,
            title: long_title,
            description: link_spam,
        },
        metrics("거짓 의심 불신 나쁘다", "거짓 의심 불신 나쁘다"),
    ];

    for sample in &cases {
        let evaluation = engine.evaluate(sample, now());
        for score in [
            evaluation.source_score,
            evaluation.content_score,
            evaluation.total_score,
        ] {
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
        assert_eq!(evaluation.grade, Grade::from_score(evaluation.total_score));
    }
}

#[test]
fn higher_totals_never_receive_worse_grades() {
    let mut previous = Grade::F;
    for step in 0..=100 {
        let score = f64::from(step) / 100.0;
        let grade = Grade::from_score(score);
        assert!(grade <= previous, "grade worsened at {score}");
        previous = grade;
    }
}

#[test]
fn evaluation_serializes_breakdown_for_clients() {
    let engine = EvaluationEngine::new(ScoringConfig::default());
    let evaluation = engine.evaluate(&metrics("데이터 저널리즘 입문", ""), now());

    let payload = serde_json::to_value(&evaluation).expect("evaluation encodes");

    assert!(payload.get("config_version").is_none());
    assert_eq!(payload["grade"], evaluation.grade.label());
    assert_eq!(payload["breakdown"]["source"]["subscribers"]["count"], 500_000);
    assert_eq!(payload["breakdown"]["content"]["title"]["has_required_keyword"], true);
}
