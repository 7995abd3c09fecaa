use serde::Deserialize;
use tracker_domain::value_objects::price::{PriceRecord, PriceSeries};
use tracker_domain::value_objects::profile::TickerProfile;
use tracker_domain::value_objects::ticker::TickerSymbol;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl ApiError {
    fn message(&self) -> String {
        match (self.code.as_deref(), self.description.as_deref()) {
            (Some(code), Some(desc)) => format!("{code}: {desc}"),
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => "unknown provider error".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parses a `v8/finance/chart` body.
///
/// Bars with any missing OHLC value are skipped; a missing volume counts as zero.
/// A result without timestamps (nothing traded in the window) is an empty series.
pub fn parse_chart_response(symbol: &TickerSymbol, body: &str) -> Result<PriceSeries, String> {
    let parsed: ChartResponse = serde_json::from_str(body)
        .map_err(|err| format!("failed to parse chart response: {err}"))?;

    if let Some(error) = parsed.chart.error {
        return Err(format!("chart error for {symbol}: {}", error.message()));
    }
    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(format!("chart response for {symbol} has no result"));
    };

    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let field = |values: &[Option<f64>], idx: usize| values.get(idx).copied().flatten();
    let mut skipped = 0usize;
    let records: Vec<PriceRecord> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(idx, &timestamp)| {
            let ohlc = (
                field(&quote.open, idx),
                field(&quote.high, idx),
                field(&quote.low, idx),
                field(&quote.close, idx),
            );
            match ohlc {
                (Some(open), Some(high), Some(low), Some(close)) => Some(PriceRecord {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume: field(&quote.volume, idx).unwrap_or(0.0),
                }),
                _ => {
                    skipped += 1;
                    None
                }
            }
        })
        .collect();

    if skipped > 0 {
        tracing::debug!(%symbol, skipped, "skipped bars with missing prices");
    }
    Ok(PriceSeries::new(symbol.clone(), offset, records))
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: SummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(default)]
    result: Option<Vec<SummaryResult>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceModule>,
    #[serde(rename = "assetProfile", default)]
    asset_profile: Option<AssetProfileModule>,
}

#[derive(Debug, Deserialize)]
struct PriceModule {
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssetProfileModule {
    #[serde(rename = "longBusinessSummary", default)]
    long_business_summary: Option<String>,
}

/// Parses a `v10/finance/quoteSummary` body with the `price` and `assetProfile` modules.
/// Absent fields stay `None`; the caller decides whether that is a problem.
pub fn parse_profile_response(symbol: &TickerSymbol, body: &str) -> Result<TickerProfile, String> {
    let parsed: SummaryResponse = serde_json::from_str(body)
        .map_err(|err| format!("failed to parse quoteSummary response: {err}"))?;

    if let Some(error) = parsed.quote_summary.error {
        return Err(format!("quoteSummary error for {symbol}: {}", error.message()));
    }
    let result = parsed
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| format!("quoteSummary response for {symbol} has no result"))?;

    Ok(TickerProfile {
        long_name: result.price.and_then(|p| p.long_name),
        summary: result.asset_profile.and_then(|p| p.long_business_summary),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_chart_response, parse_profile_response};
    use tracker_domain::value_objects::ticker::TickerSymbol;

    fn aapl() -> TickerSymbol {
        TickerSymbol::parse("AAPL").expect("symbol")
    }

    const CHART: &str = r#"{
      "chart": {
        "result": [{
          "meta": { "symbol": "AAPL", "gmtoffset": -14400, "exchangeTimezoneName": "America/New_York" },
          "timestamp": [1704205860, 1704205800, 1704205920, 1704205980],
          "indicators": { "quote": [{
            "open":   [101.0, 100.0, null, 103.0],
            "high":   [102.0, 101.0, 103.0, 104.0],
            "low":    [100.5,  99.5, 101.0, 102.0],
            "close":  [101.5, 100.5, 102.5, 103.5],
            "volume": [1200, 0, 500, null]
          }]}
        }],
        "error": null
      }
    }"#;

    #[test]
    fn chart_rows_are_sorted_and_incomplete_bars_dropped() {
        let series = parse_chart_response(&aapl(), CHART).expect("chart");
        assert_eq!(series.utc_offset_seconds(), -14_400);
        let stamps: Vec<i64> = series.records().iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![1_704_205_800, 1_704_205_860, 1_704_205_980]);
        assert_eq!(series.records()[0].volume, 0.0);
        assert_eq!(series.records()[1].volume, 1200.0);
        // null volume
        assert_eq!(series.records()[2].volume, 0.0);
    }

    #[test]
    fn chart_error_object_becomes_err() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart_response(&aapl(), body).expect_err("error");
        assert!(err.contains("Not Found"));
        assert!(err.contains("delisted"));
    }

    #[test]
    fn chart_without_timestamps_is_empty() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let series = parse_chart_response(&aapl(), body).expect("chart");
        assert!(series.is_empty());
    }

    #[test]
    fn malformed_chart_is_err() {
        assert!(parse_chart_response(&aapl(), "<html>").is_err());
    }

    #[test]
    fn profile_fields_are_extracted() {
        let body = r#"{"quoteSummary":{"result":[{
            "price":{"longName":"Apple Inc.","symbol":"AAPL"},
            "assetProfile":{"longBusinessSummary":"Apple Inc. designs smartphones."}
        }],"error":null}}"#;
        let profile = parse_profile_response(&aapl(), body).expect("profile");
        assert_eq!(profile.long_name.as_deref(), Some("Apple Inc."));
        assert!(profile.missing_field().is_none());
    }

    #[test]
    fn profile_without_summary_reports_missing_field() {
        let body = r#"{"quoteSummary":{"result":[{"price":{"longName":"SPDR S&P 500"}}],"error":null}}"#;
        let profile = parse_profile_response(&aapl(), body).expect("profile");
        assert_eq!(profile.missing_field(), Some("longBusinessSummary"));
    }

    #[test]
    fn profile_error_is_err() {
        let body = r#"{"quoteSummary":{"result":null,"error":{"code":"Unauthorized","description":"Invalid Crumb"}}}"#;
        let err = parse_profile_response(&aapl(), body).expect_err("error");
        assert!(err.contains("Invalid Crumb"));
    }
}
