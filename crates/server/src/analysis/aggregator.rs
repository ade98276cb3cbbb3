use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use radar_core::{AggregatedReport, ChunkReport, Language};
use radar_llm::{RiskError, RiskExtraction};
use tracing::info;

/// Run risk extraction once per chunk and collect the reports in chunk order.
///
/// With `concurrency == 1` chunks are processed strictly one after another.
/// Higher values keep up to that many calls in flight, but results are still
/// reassembled by chunk index, never by completion order. The first failing
/// chunk aborts the whole aggregation and in-flight calls are dropped.
///
/// Each per-chunk future owns its inputs, so the returned future is `Send`
/// regardless of the caller's borrows.
pub async fn aggregate(
    extractor: Arc<dyn RiskExtraction>,
    chunks: Vec<String>,
    context: &str,
    lang: Language,
    concurrency: usize,
) -> Result<AggregatedReport, RiskError> {
    let total = chunks.len();
    let context: Arc<str> = Arc::from(context);

    let chunks = stream::iter(chunks.into_iter().enumerate())
        .map(move |(i, chunk)| {
            let extractor = Arc::clone(&extractor);
            let context = Arc::clone(&context);
            async move {
                let chunk_id = i + 1;
                info!("Analyzing chunk {}/{}", chunk_id, total);
                let report = extractor.extract_risks(&chunk, &context, lang).await?;
                Ok::<_, RiskError>(ChunkReport {
                    chunk_id,
                    chunk_chars: chunk.chars().count(),
                    report,
                })
            }
        })
        .buffered(concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await?;

    Ok(AggregatedReport::Chunked { chunks })
}
