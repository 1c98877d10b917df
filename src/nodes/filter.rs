//! Filter stage: caps long listings in the accumulated results.

use serde_json::json;
use tracing::{info, instrument};

use crate::result_filter::filter_results;
use crate::types::{RunState, Stage};

#[instrument(level = "trace", skip(state))]
pub(crate) fn filter(state: &mut RunState) {
  state.trace(Stage::Filter, "결과 필터링 노드 시작");
  let results = state.concatenated_results();
  state.log(
    "결과 필터링 시작",
    json!({ "original_result_length": results.chars().count() }),
  );

  let outcome = filter_results(&results, state.query());
  match outcome.limit_applied {
    Some(limit) => {
      info!(count = outcome.entity_count, limit, "capped results");
      state.log(
        format!("결과 필터링 완료: {}개 → {limit}개", outcome.entity_count),
        json!({
          "original_count": outcome.entity_count,
          "filtered_count": limit,
          "filtered_result_length": outcome.text.chars().count(),
        }),
      );
    }
    None => {
      info!(count = outcome.entity_count, "results kept whole");
      state.log(
        format!("모든 결과 표시: {}개", outcome.entity_count),
        json!({ "total_count": outcome.entity_count }),
      );
    }
  }
  state.filtered_result = Some(outcome.text);
  state.trace(Stage::Filter, "결과 필터링 노드 완료");
}
