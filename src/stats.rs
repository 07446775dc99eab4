//! Colibri statistics payload model and the conference-size distribution.

use serde::Deserialize;

/// Raw statistics document returned by the videobridge's `/colibri/stats`
/// endpoint.
///
/// Every scalar defaults to zero when absent; the payload shape varies
/// between videobridge versions and fields come and go.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatsDocument {
    pub threads: f64,
    pub used_memory: f64,
    pub total_memory: f64,
    pub cpu_usage: f64,
    pub bit_rate_download: f64,
    pub bit_rate_upload: f64,
    pub packet_rate_download: f64,
    pub packet_rate_upload: f64,
    pub loss_rate_download: f64,
    pub loss_rate_upload: f64,
    pub rtp_loss: f64,
    pub jitter_aggregate: f64,
    pub rtt_aggregate: f64,
    pub largest_conference: f64,
    /// Index `i` holds the number of active conferences with `i + 1`
    /// participants; the final element counts every conference at or above
    /// the largest tracked size.
    pub conference_sizes: Vec<u64>,
    pub audiochannels: f64,
    pub videochannels: f64,
    pub conferences: f64,
    pub participants: f64,
    pub videostreams: f64,
    pub total_loss_controlled_participant_seconds: f64,
    pub total_loss_limited_participant_seconds: f64,
    pub total_loss_degraded_participant_seconds: f64,
    pub total_conference_seconds: f64,
    pub total_conferences_created: f64,
    pub total_failed_conferences: f64,
    pub total_partially_failed_conferences: f64,
    pub total_data_channel_messages_received: f64,
    pub total_data_channel_messages_sent: f64,
    pub total_colibri_web_socket_messages_received: f64,
    pub total_colibri_web_socket_messages_sent: f64,
}

/// Cumulative conference-size histogram derived from the raw per-size counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeDistribution {
    /// Ascending `(upper_bound, cumulative_count)` pairs. The unbounded
    /// final bucket is implicit and never stored here.
    pub buckets: Vec<(f64, u64)>,
    /// Total of all raw elements, overflow element included. Kept
    /// independent of the `conferences` gauge so the histogram stays
    /// self-consistent even when other fields are stale.
    pub sum: u64,
}

/// Build the cumulative distribution from the raw per-size count array.
///
/// The last element of `counts` is an overflow count for conferences at or
/// above the largest tracked size. It contributes to the sum but must not
/// become an explicit bucket: the exposition format's `+Inf` bucket absorbs
/// it, and emitting it twice would double-count.
pub fn build_size_distribution(counts: &[u64]) -> SizeDistribution {
    let sum = counts.iter().sum();

    // Nothing to trim on an empty input.
    let Some((_overflow, explicit)) = counts.split_last() else {
        return SizeDistribution {
            buckets: Vec::new(),
            sum,
        };
    };

    let mut cumulative = 0u64;
    let buckets = explicit
        .iter()
        .enumerate()
        .map(|(i, count)| {
            cumulative += count;
            (i as f64, cumulative)
        })
        .collect();

    SizeDistribution { buckets, sum }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counts() {
        let dist = build_size_distribution(&[]);
        assert!(dist.buckets.is_empty());
        assert_eq!(dist.sum, 0);
    }

    #[test]
    fn test_single_element_is_overflow_only() {
        let dist = build_size_distribution(&[5]);
        assert!(dist.buckets.is_empty());
        assert_eq!(dist.sum, 5);
    }

    #[test]
    fn test_prefix_sums_and_overflow() {
        let dist = build_size_distribution(&[2, 3, 1]);
        assert_eq!(dist.buckets, vec![(0.0, 2), (1.0, 5)]);
        assert_eq!(dist.sum, 6);
    }

    #[test]
    fn test_sum_includes_every_element() {
        let counts = [0, 7, 2, 0, 11, 3];
        let dist = build_size_distribution(&counts);
        assert_eq!(dist.sum, counts.iter().sum::<u64>());
    }

    #[test]
    fn test_bucket_count_and_monotonicity() {
        let counts = [4, 0, 9, 1, 0, 2, 6];
        let dist = build_size_distribution(&counts);

        assert_eq!(dist.buckets.len(), counts.len() - 1);
        for window in dist.buckets.windows(2) {
            assert!(window[0].0 < window[1].0);
            assert!(window[0].1 <= window[1].1);
        }
    }

    #[test]
    fn test_last_bucket_excludes_overflow() {
        let dist = build_size_distribution(&[1, 2, 3, 100]);
        assert_eq!(dist.buckets.last(), Some(&(2.0, 6)));
        assert_eq!(dist.sum, 106);
    }

    #[test]
    fn test_decode_document_with_missing_fields() {
        let doc: StatsDocument =
            serde_json::from_str(r#"{"threads": 4, "conference_sizes": [1, 0, 1]}"#).unwrap();

        assert_eq!(doc.threads, 4.0);
        assert_eq!(doc.conference_sizes, vec![1, 0, 1]);
        assert_eq!(doc.cpu_usage, 0.0);
        assert_eq!(doc.participants, 0.0);
    }

    #[test]
    fn test_decode_document_rejects_wrong_types() {
        let result =
            serde_json::from_str::<StatsDocument>(r#"{"conference_sizes": "not-an-array"}"#);
        assert!(result.is_err());
    }
}
