//! Deep links into the controller UI.
//!
//! The controller parses the fragment of these URLs verbatim, so the layout
//! below (end before start, trailing granularity) must not change.

const DASHBOARD_GRANULARITY: u32 = 19;
const RELEASE_ANALYSIS_GRANULARITY: u32 = 60;

fn custom_time_range(start_ms: i64, end_ms: i64, granularity: u32) -> String {
    format!("Custom_Time_Range.BETWEEN_TIMES.{end_ms}.{start_ms}.{granularity}")
}

/// Link to the application dashboard for the window `[start_ms, end_ms]`.
///
/// ```
/// use appd_regress::links::dashboard_url;
///
/// let url = dashboard_url("http://ctrl:8090/controller/", 7, 1_000, 61_000);
/// assert_eq!(
///     url,
///     "http://ctrl:8090/controller/#/location=APP_DASHBOARD&application=7\
///      &timeRange=Custom_Time_Range.BETWEEN_TIMES.61000.1000.19&dashboardMode=force"
/// );
/// ```
pub fn dashboard_url(base_uri: &str, application_id: i64, start_ms: i64, end_ms: i64) -> String {
    format!(
        "{base_uri}#/location=APP_DASHBOARD&application={application_id}&timeRange={}&dashboardMode=force",
        custom_time_range(start_ms, end_ms, DASHBOARD_GRANULARITY)
    )
}

/// Link to the release-analysis view comparing two `(start_ms, end_ms)` windows.
pub fn compare_release_url(
    base_uri: &str,
    application_id: i64,
    current: (i64, i64),
    previous: (i64, i64),
) -> String {
    let current = custom_time_range(current.0, current.1, RELEASE_ANALYSIS_GRANULARITY);
    let previous = custom_time_range(previous.0, previous.1, RELEASE_ANALYSIS_GRANULARITY);
    format!(
        "{base_uri}#/location=APP_RELEASE_ANALYSIS&application={application_id}\
         &timeRange={current}&timeRange1={current}&timeRange2={previous}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compare_url_layout() {
        let url = compare_release_url("http://c/controller/", 4, (100, 200), (10, 20));
        assert_eq!(
            url,
            "http://c/controller/#/location=APP_RELEASE_ANALYSIS&application=4\
             &timeRange=Custom_Time_Range.BETWEEN_TIMES.200.100.60\
             &timeRange1=Custom_Time_Range.BETWEEN_TIMES.200.100.60\
             &timeRange2=Custom_Time_Range.BETWEEN_TIMES.20.10.60"
        );
    }

    #[test]
    fn test_dashboard_url_puts_end_first() {
        let url = dashboard_url("b/", 1, 5, 9);
        assert!(url.contains("BETWEEN_TIMES.9.5.19"));
    }
}
