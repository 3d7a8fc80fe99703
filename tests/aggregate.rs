// Candidate aggregation through the public pipeline entry point.

mod support;

use std::collections::BTreeMap;

use electmap::{aggregate_candidates, ConstituencyId, Error, Fetched, PipelineConfig};
use serde_json::json;

fn config() -> PipelineConfig {
    PipelineConfig {
        endpoints: support::endpoints(),
        candidate_image_base: "https://img.example/".into(),
        ..PipelineConfig::default()
    }
}

#[test]
fn leading_candidate_and_stats() {
    let config = config();
    let records = json!([
        { "CandidateID": 1, "DistrictCd": 27, "SCConstID": 1, "PoliticalPartyName": "A", "TotalVoteReceived": 500, "Gender": "पुरुष" },
        { "CandidateID": 2, "DistrictCd": 27, "SCConstID": 1, "PoliticalPartyName": "B", "TotalVoteReceived": 900, "Gender": "महि", "Remarks": "Elected" },
    ]);
    let fetcher = support::fetcher().with_json(&config.endpoints.candidates, records.to_string());

    let out = aggregate_candidates(&config, &fetcher).unwrap();
    assert_eq!(out.leading.len(), 1);
    let leader = &out.leading[0];
    assert_eq!(leader.constituency_id, ConstituencyId(271));
    assert_eq!((leader.party.as_str(), leader.votes), ("B", 900));
    assert!(leader.elected);
    assert_eq!(leader.image_url, "https://img.example/2");

    assert_eq!(out.stats.total_votes, 1400);
    assert_eq!(out.stats.total_seats, 1);
    assert_eq!(out.stats.party_standings, BTreeMap::from([("B".to_string(), 1)]));
    assert_eq!(out.stats.gender_breakdown.female, 1);
    assert_eq!(out.stats.gender_breakdown.other, 1);
}

#[test]
fn malformed_records_are_reported_not_fatal() {
    let config = config();
    let records = json!([
        { "CandidateID": 1, "DistrictCd": 27, "SCConstID": 1, "TotalVoteReceived": 10 },
        { "CandidateID": 2, "SCConstID": 1, "TotalVoteReceived": 99 },
    ]);
    let fetcher = support::fetcher().with_json(&config.endpoints.candidates, records.to_string());

    let out = aggregate_candidates(&config, &fetcher).unwrap();
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.warnings.len(), 1);
    assert!(matches!(out.warnings[0], Error::MalformedCandidate { candidate_id: Some(2), .. }));
}

#[test]
fn vote_file_with_no_usable_record_fails() {
    let config = config();
    let records = json!([
        { "CandidateID": 1, "SCConstID": 1 },
        { "CandidateID": 2, "DistrictCd": 27, "TotalVoteReceived": 5 },
        "not a record",
    ]);
    let fetcher = support::fetcher().with_json(&config.endpoints.candidates, records.to_string());

    match aggregate_candidates(&config, &fetcher) {
        Err(Error::EmptyCandidates { warnings }) => {
            assert_eq!(warnings.len(), 3);
            assert!(matches!(warnings[0], Error::MalformedCandidate { candidate_id: Some(1), .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn html_vote_file_is_rejected() {
    let config = config();
    let page = Fetched { bytes: b"[]".to_vec(), content_type: Some("text/html".into()) };
    let fetcher = support::fetcher().with_response(&config.endpoints.candidates, page);

    assert!(matches!(aggregate_candidates(&config, &fetcher), Err(Error::Parse { .. })));
}
