//! Sample totals recomputed from the current seqrun children.
//!
//! Every seqrun mutation ends with a full recompute rather than an
//! incremental delta, so a stale total heals on the next write.

use tracing::debug;

use crate::domain::entities::{
    Sample, SeqRun, TOTAL_AUTOSOMAL_COVERAGE, TOTAL_SEQUENCED_READS, from_document,
};
use crate::domain::field::FieldValue;
use crate::domain::ports::{IndexKey, IndexName, KeyRange};
use crate::domain::{DomainError, RequestContext, Saver};

/// Summed measures over a set of seqruns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleTotals {
    /// Sum of `mean_autosomal_coverage`.
    pub autosomal_coverage: f64,
    /// Sum of `total_reads`.
    pub sequenced_reads: f64,
}

impl SampleTotals {
    /// Totals over `seqruns`; unset measures count as zero.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "rolled-up measures are float sums of seqrun values"
    )]
    pub fn sum<'a>(seqruns: impl IntoIterator<Item = &'a SeqRun>) -> Self {
        seqruns
            .into_iter()
            .fold(Self::default(), |totals, seqrun| Self {
                autosomal_coverage: totals.autosomal_coverage + seqrun.mean_autosomal_coverage,
                sequenced_reads: totals.sequenced_reads + seqrun.total_reads,
            })
    }
}

/// Recompute the totals of sample `projectid/sampleid` and save them.
///
/// Both the seqrun set and the sample are read fresh from the store,
/// bypassing the request cache. Unchanged totals cause no write.
pub async fn rollup_sample(
    ctx: &RequestContext,
    projectid: &str,
    sampleid: &str,
) -> Result<Sample, DomainError> {
    let scope = IndexKey::new([projectid, sampleid]);
    let seqruns = ctx
        .fresh_range(IndexName::SeqRunId, &KeyRange::prefix(scope.clone()))
        .await?
        .into_iter()
        .map(|row| from_document::<SeqRun>(row.document))
        .collect::<Result<Vec<_>, _>>()?;
    let totals = SampleTotals::sum(&seqruns);

    let sample = ctx
        .fresh_range(IndexName::SampleId, &KeyRange::exact(scope))
        .await?
        .into_iter()
        .next()
        .map(|row| from_document::<Sample>(row.document))
        .transpose()?
        .ok_or_else(|| DomainError::not_found(format!("sample {projectid}/{sampleid} not found")))?;

    debug!(
        projectid,
        sampleid,
        seqruns = seqruns.len(),
        reads = totals.sequenced_reads,
        "rolling up sample totals"
    );
    let mut saver = Saver::update(ctx, sample);
    saver.set(
        TOTAL_AUTOSOMAL_COVERAGE,
        Some(FieldValue::Float(totals.autosomal_coverage)),
    )?;
    saver.set(
        TOTAL_SEQUENCED_READS,
        Some(FieldValue::Float(totals.sequenced_reads)),
    )?;
    saver.commit().await
}
