//! Normalized metrics snapshot and the document-to-snapshot assembler.

use crate::stats::{SizeDistribution, StatsDocument, build_size_distribution};

/// Prometheus metric kind for a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Instantaneous value.
    Gauge,
    /// Strictly-increasing lifetime total.
    Counter,
}

impl MetricKind {
    /// The TYPE comment string for Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Flat, normalized view of a [`StatsDocument`], ready for exposition.
///
/// One like-named scalar per document field plus the derived conference-size
/// distribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
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
    pub conference_sizes: SizeDistribution,
}

impl MetricsSnapshot {
    /// Map a decoded statistics document onto a snapshot.
    ///
    /// The mapping is total and one-to-one by field name; no source field
    /// feeds more than one output and none is dropped.
    pub fn assemble(doc: &StatsDocument) -> Self {
        Self {
            threads: doc.threads,
            used_memory: doc.used_memory,
            total_memory: doc.total_memory,
            cpu_usage: doc.cpu_usage,
            bit_rate_download: doc.bit_rate_download,
            bit_rate_upload: doc.bit_rate_upload,
            packet_rate_download: doc.packet_rate_download,
            packet_rate_upload: doc.packet_rate_upload,
            loss_rate_download: doc.loss_rate_download,
            loss_rate_upload: doc.loss_rate_upload,
            rtp_loss: doc.rtp_loss,
            jitter_aggregate: doc.jitter_aggregate,
            rtt_aggregate: doc.rtt_aggregate,
            largest_conference: doc.largest_conference,
            audiochannels: doc.audiochannels,
            videochannels: doc.videochannels,
            conferences: doc.conferences,
            participants: doc.participants,
            videostreams: doc.videostreams,
            total_loss_controlled_participant_seconds: doc
                .total_loss_controlled_participant_seconds,
            total_loss_limited_participant_seconds: doc.total_loss_limited_participant_seconds,
            total_loss_degraded_participant_seconds: doc.total_loss_degraded_participant_seconds,
            total_conference_seconds: doc.total_conference_seconds,
            total_conferences_created: doc.total_conferences_created,
            total_failed_conferences: doc.total_failed_conferences,
            total_partially_failed_conferences: doc.total_partially_failed_conferences,
            total_data_channel_messages_received: doc.total_data_channel_messages_received,
            total_data_channel_messages_sent: doc.total_data_channel_messages_sent,
            total_colibri_web_socket_messages_received: doc
                .total_colibri_web_socket_messages_received,
            total_colibri_web_socket_messages_sent: doc.total_colibri_web_socket_messages_sent,
            conference_sizes: build_size_distribution(&doc.conference_sizes),
        }
    }

    /// Scalar fields in exposition order with their metric kinds.
    ///
    /// Instantaneous values are gauges; the `total_*` lifetime counters are
    /// counters.
    pub fn scalars(&self) -> [(&'static str, MetricKind, f64); 30] {
        use MetricKind::{Counter, Gauge};

        [
            ("threads", Gauge, self.threads),
            ("used_memory", Gauge, self.used_memory),
            ("total_memory", Gauge, self.total_memory),
            ("cpu_usage", Gauge, self.cpu_usage),
            ("bit_rate_download", Gauge, self.bit_rate_download),
            ("bit_rate_upload", Gauge, self.bit_rate_upload),
            ("packet_rate_download", Gauge, self.packet_rate_download),
            ("packet_rate_upload", Gauge, self.packet_rate_upload),
            ("loss_rate_download", Gauge, self.loss_rate_download),
            ("loss_rate_upload", Gauge, self.loss_rate_upload),
            ("rtp_loss", Gauge, self.rtp_loss),
            ("jitter_aggregate", Gauge, self.jitter_aggregate),
            ("rtt_aggregate", Gauge, self.rtt_aggregate),
            ("largest_conference", Gauge, self.largest_conference),
            ("audiochannels", Gauge, self.audiochannels),
            ("videochannels", Gauge, self.videochannels),
            ("conferences", Gauge, self.conferences),
            ("participants", Gauge, self.participants),
            ("videostreams", Gauge, self.videostreams),
            (
                "total_loss_controlled_participant_seconds",
                Counter,
                self.total_loss_controlled_participant_seconds,
            ),
            (
                "total_loss_limited_participant_seconds",
                Counter,
                self.total_loss_limited_participant_seconds,
            ),
            (
                "total_loss_degraded_participant_seconds",
                Counter,
                self.total_loss_degraded_participant_seconds,
            ),
            (
                "total_conference_seconds",
                Counter,
                self.total_conference_seconds,
            ),
            (
                "total_conferences_created",
                Counter,
                self.total_conferences_created,
            ),
            (
                "total_failed_conferences",
                Counter,
                self.total_failed_conferences,
            ),
            (
                "total_partially_failed_conferences",
                Counter,
                self.total_partially_failed_conferences,
            ),
            (
                "total_data_channel_messages_received",
                Counter,
                self.total_data_channel_messages_received,
            ),
            (
                "total_data_channel_messages_sent",
                Counter,
                self.total_data_channel_messages_sent,
            ),
            (
                "total_colibri_web_socket_messages_received",
                Counter,
                self.total_colibri_web_socket_messages_received,
            ),
            (
                "total_colibri_web_socket_messages_sent",
                Counter,
                self.total_colibri_web_socket_messages_sent,
            ),
        ]
    }
}
