//! Agenda embed URL.

use url::Url;

/// Agenda-mode embed URL for `calendar_ids`, shown in `timezone`.
pub fn agenda_embed_url(
    base: &str,
    timezone: &str,
    calendar_ids: &[String],
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("mode", "AGENDA");
        for flag in ["showTitle", "showPrint", "showTabs", "showCalendars", "showTz"] {
            query.append_pair(flag, "0");
        }
        query.append_pair("ctz", timezone);
        for id in calendar_ids {
            query.append_pair("src", id);
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const BASE: &str = "https://calendar.google.com/calendar/embed";

    #[test]
    fn test_agenda_url() {
        let ids = vec!["primary".to_string(), "team@example.com".to_string()];
        let url = agenda_embed_url(BASE, "America/Chicago", &ids).unwrap();

        assert_eq!(
            url.as_str(),
            "https://calendar.google.com/calendar/embed?mode=AGENDA&showTitle=0&showPrint=0\
             &showTabs=0&showCalendars=0&showTz=0&ctz=America%2FChicago\
             &src=primary&src=team%40example.com"
        );
    }

    #[test]
    fn test_one_src_per_calendar() {
        let ids: Vec<String> = (0..3).map(|i| format!("cal{i}")).collect();
        let url = agenda_embed_url(BASE, "UTC", &ids).unwrap();

        let srcs: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "src")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(srcs, ids);
    }

    #[test]
    fn test_bad_base() {
        assert!(agenda_embed_url("not a url", "UTC", &[]).is_err());
    }
}
