//! Query planning over a relay.
//!
//! `CalendarQuery` builds filters for each access pattern, runs them
//! through a `RelayClient` under a deadline and a cancellation signal, and
//! merges what comes back into ordered calendar views.

pub mod filters;
pub mod merge;

use std::time::Duration;

use chrono::{Local, Utc};

use crate::calendar::Calendar;
use crate::calendar_event::CalendarEvent;
use crate::codec::{
    parse_calendar, parse_calendar_event, parse_calendar_event_rsvp, serialize_calendar,
    serialize_calendar_event, serialize_calendar_rsvp,
};
use crate::constants::{
    PUBLISH_TIMEOUT, QUERY_TIMEOUT, RANGE_QUERY_LIMIT, SEARCH_OVERFETCH,
};
use crate::coordinate::Coordinate;
use crate::date_range::DateRange;
use crate::draft::{EventDraft, RsvpDraft};
use crate::error::{CalResult, CalendarError};
use crate::event::{RawEvent, UnsignedEvent};
use crate::relay::{Cancellation, Filter, RelayClient, bounded};
use crate::rsvp::CalendarEventRsvp;
use crate::validate::{check_calendar, check_calendar_event, check_calendar_event_rsvp};

use self::merge::{
    SearchTerms, decode_calendars, decode_events, decode_rsvps, latest_calendars,
    latest_versions, merge_search, next_cursor, retain_upcoming_in, sort_chronologically_in,
};

/// One page of upcoming events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub events: Vec<CalendarEvent>,
    /// Pass as `until` to fetch the next page. `None` once the relay has
    /// nothing older left.
    pub next_cursor: Option<i64>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.events.is_empty()
    }
}

pub struct CalendarQuery<R> {
    relay: R,
    query_timeout: Duration,
    publish_timeout: Duration,
}

impl<R: RelayClient> CalendarQuery<R> {
    pub fn new(relay: R) -> Self {
        CalendarQuery {
            relay,
            query_timeout: QUERY_TIMEOUT,
            publish_timeout: PUBLISH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    async fn fetch(&self, filters: &[Filter], cancel: &Cancellation) -> CalResult<Vec<RawEvent>> {
        let events = bounded(self.relay.query(filters), self.query_timeout, cancel).await?;
        tracing::debug!(filters = filters.len(), returned = events.len(), "Relay query finished");
        Ok(events)
    }

    /// The latest `limit` events of either kind, in start order.
    pub async fn recent(&self, limit: usize, cancel: &Cancellation) -> CalResult<Vec<CalendarEvent>> {
        let raw = self.fetch(&[filters::recent(limit)], cancel).await?;
        let mut events = decode_events(&raw);
        sort_chronologically_in(&mut events, &Local);
        Ok(events)
    }

    /// Events that have not started yet, paged by creation time.
    ///
    /// Pass the previous page's `next_cursor` as `until`. The two kinds are
    /// fetched concurrently; either failing fails the page. A window whose
    /// events have all started is skipped, so an empty page means the relay
    /// has nothing older left.
    pub async fn upcoming(
        &self,
        limit: usize,
        mut until: Option<i64>,
        cancel: &Cancellation,
    ) -> CalResult<Page> {
        loop {
            let [time_filter, date_filter] = filters::upcoming(limit, until);
            let (timed, dated) = tokio::join!(
                self.fetch(std::slice::from_ref(&time_filter), cancel),
                self.fetch(std::slice::from_ref(&date_filter), cancel),
            );

            let mut raw = timed?;
            raw.extend(dated?);

            let Some(cursor) = next_cursor(&raw) else {
                return Ok(Page {
                    events: Vec::new(),
                    next_cursor: None,
                });
            };

            let mut events = decode_events(&raw);
            retain_upcoming_in(&mut events, Utc::now(), &Local);
            if events.is_empty() {
                tracing::debug!(cursor, "No upcoming events in window, stepping back");
                until = Some(cursor);
                continue;
            }

            sort_chronologically_in(&mut events, &Local);
            return Ok(Page {
                events,
                next_cursor: Some(cursor),
            });
        }
    }

    /// Events overlapping `range`, in start order.
    pub async fn in_range(
        &self,
        range: &DateRange,
        cancel: &Cancellation,
    ) -> CalResult<Vec<CalendarEvent>> {
        let raw = self.fetch(&[filters::range(RANGE_QUERY_LIMIT)], cancel).await?;
        let mut events = decode_events(&raw);
        events.retain(|event| range.overlaps(event));
        sort_chronologically_in(&mut events, &Local);
        Ok(events)
    }

    /// Free-text search. A leading `#` also asks relays for that hashtag.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        cancel: &Cancellation,
    ) -> CalResult<Vec<CalendarEvent>> {
        let terms = SearchTerms::parse(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let hashtag_query = async {
            match terms.hashtag {
                Some(ref tag) => self.fetch(&[filters::hashtag(tag, limit)], cancel).await,
                None => Ok(Vec::new()),
            }
        };
        let broad_filter = [filters::broad(limit.saturating_mul(SEARCH_OVERFETCH))];
        let broad_query = self.fetch(&broad_filter, cancel);
        let (hashtag_raw, broad_raw) = tokio::join!(hashtag_query, broad_query);

        Ok(merge_search(
            decode_events(&hashtag_raw?),
            decode_events(&broad_raw?),
            &terms,
            limit,
        ))
    }

    /// The newest version of the event at `coordinate`, if any relay has it.
    pub async fn event(
        &self,
        coordinate: &Coordinate,
        cancel: &Cancellation,
    ) -> CalResult<Option<CalendarEvent>> {
        let raw = self.fetch(&[filters::coordinate(coordinate)], cancel).await?;
        Ok(decode_events(&raw)
            .into_iter()
            .max_by(|a, b| a.created_at().cmp(&b.created_at()).then_with(|| b.id().cmp(a.id()))))
    }

    /// Calendars, newest version of each, optionally for one author.
    pub async fn calendars(
        &self,
        author: Option<&str>,
        limit: usize,
        cancel: &Cancellation,
    ) -> CalResult<Vec<Calendar>> {
        let raw = self.fetch(&[filters::calendars(author, limit)], cancel).await?;
        Ok(latest_calendars(decode_calendars(&raw)))
    }

    /// Resolve a calendar's references. Dangling references are skipped.
    pub async fn calendar_events(
        &self,
        calendar: &Calendar,
        cancel: &Cancellation,
    ) -> CalResult<Vec<CalendarEvent>> {
        if calendar.events.is_empty() {
            return Ok(Vec::new());
        }

        let filters: Vec<Filter> = calendar.events.iter().map(filters::coordinate).collect();
        let raw = self.fetch(&filters, cancel).await?;
        let mut events = latest_versions(decode_events(&raw));
        sort_chronologically_in(&mut events, &Local);
        Ok(events)
    }

    /// RSVPs referencing `coordinate`, newest first.
    pub async fn rsvps(
        &self,
        coordinate: &Coordinate,
        cancel: &Cancellation,
    ) -> CalResult<Vec<CalendarEventRsvp>> {
        let raw = self.fetch(&[filters::rsvps(coordinate)], cancel).await?;
        let mut rsvps = decode_rsvps(&raw);
        rsvps.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rsvps)
    }

    async fn submit(&self, event: &UnsignedEvent, cancel: &Cancellation) -> CalResult<RawEvent> {
        let published = bounded(self.relay.publish(event), self.publish_timeout, cancel).await?;
        tracing::info!(id = %published.id, kind = published.kind, "Published event");
        Ok(published)
    }

    /// Check the draft, publish it, and return the event as accepted.
    pub async fn publish_event(
        &self,
        draft: EventDraft,
        cancel: &Cancellation,
    ) -> CalResult<CalendarEvent> {
        let event = draft.build()?;
        let published = self.submit(&serialize_calendar_event(&event), cancel).await?;
        check_calendar_event(&published).map_err(rejected)?;
        parse_calendar_event(&published).ok_or_else(unparsable)
    }

    pub async fn publish_rsvp(
        &self,
        draft: RsvpDraft,
        cancel: &Cancellation,
    ) -> CalResult<CalendarEventRsvp> {
        let rsvp = draft.build()?;
        let published = self.submit(&serialize_calendar_rsvp(&rsvp), cancel).await?;
        check_calendar_event_rsvp(&published).map_err(rejected)?;
        parse_calendar_event_rsvp(&published).ok_or_else(unparsable)
    }

    pub async fn publish_calendar(
        &self,
        calendar: &Calendar,
        cancel: &Cancellation,
    ) -> CalResult<Calendar> {
        let published = self.submit(&serialize_calendar(calendar), cancel).await?;
        check_calendar(&published).map_err(rejected)?;
        parse_calendar(&published).ok_or_else(unparsable)
    }
}

fn rejected(reason: crate::error::ValidationError) -> CalendarError {
    CalendarError::Relay(format!("relay returned an invalid event: {reason}"))
}

fn unparsable() -> CalendarError {
    CalendarError::Relay("relay returned an unparsable event".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftTiming;
    use crate::error::DraftError;
    use crate::event::Tag;
    use crate::relay::MemoryRelay;
    use crate::rsvp::{FreeBusy, RsvpStatus};

    fn raw(id: &str, kind: u16, created_at: i64, tags: &[&[&str]]) -> RawEvent {
        RawEvent {
            id: id.into(),
            pubkey: "pub1".into(),
            kind,
            created_at,
            content: String::new(),
            tags: tags.iter().map(|t| Tag::new(t.iter().copied())).collect(),
            sig: String::new(),
        }
    }

    fn timed(id: &str, created_at: i64, start: i64) -> RawEvent {
        let start = start.to_string();
        raw(id, 31923, created_at, &[&["d", id], &["title", id], &["start", &start]])
    }

    fn ids(events: &[CalendarEvent]) -> Vec<&str> {
        events.iter().map(CalendarEvent::id).collect()
    }

    #[test_log::test(tokio::test)]
    async fn test_recent_drops_invalid_and_sorts() {
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                timed("b", 10, 2_000_000_000),
                timed("a", 20, 1_900_000_000),
                raw("broken", 31923, 30, &[&["d", "x"], &["title", "x"], &["start", "0"]]),
            ],
        );

        let events = CalendarQuery::new(relay).recent(10, &Cancellation::never()).await.unwrap();
        assert_eq!(ids(&events), vec!["a", "b"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_upcoming_filters_past_and_pages() {
        let now = Utc::now().timestamp();
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                timed("past", 50, now - 3_600),
                timed("soon", 40, now + 3_600),
                timed("later", 30, now + 7_200),
                raw("far-day", 31922, 20, &[&["d", "fd"], &["title", "Far"], &["start", "2999-01-01"]]),
            ],
        );
        let query = CalendarQuery::new(relay);
        let cancel = Cancellation::never();

        let first = query.upcoming(10, None, &cancel).await.unwrap();
        assert_eq!(ids(&first.events), vec!["soon", "later", "far-day"]);
        assert_eq!(first.next_cursor, Some(19));

        let second = query.upcoming(10, first.next_cursor, &cancel).await.unwrap();
        assert!(second.is_last());
        assert_eq!(second.next_cursor, None);
    }

    #[test_log::test(tokio::test)]
    async fn test_upcoming_steps_past_a_window_of_started_events() {
        let now = Utc::now().timestamp();
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                timed("past1", 100, now - 7_200),
                timed("past2", 99, now - 3_600),
                timed("future", 50, now + 3_600),
            ],
        );
        let query = CalendarQuery::new(relay);
        let cancel = Cancellation::never();

        let first = query.upcoming(2, None, &cancel).await.unwrap();
        assert_eq!(ids(&first.events), vec!["future"]);
        assert_eq!(first.next_cursor, Some(49));

        let second = query.upcoming(2, first.next_cursor, &cancel).await.unwrap();
        assert!(second.is_last());
    }

    #[test_log::test(tokio::test)]
    async fn test_in_range_keeps_overlapping_events() {
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                // 2025-07-02T00:00Z, inside the range in every zone.
                timed("inside", 10, 1_751_414_400),
                // 2025-06-20 and 2025-07-10.
                timed("before", 20, 1_750_377_600),
                timed("after", 30, 1_752_105_600),
                raw("day", 31922, 40, &[&["d", "day"], &["title", "Day"], &["start", "2025-07-02"]]),
                raw(
                    "ended",
                    31922,
                    50,
                    &[&["d", "ended"], &["title", "Ended"], &["start", "2025-06-28"], &["end", "2025-06-30"]],
                ),
                raw(
                    "spanning",
                    31922,
                    60,
                    &[&["d", "span"], &["title", "Span"], &["start", "2025-06-28"], &["end", "2025-07-05"]],
                ),
            ],
        );
        let range = DateRange::from_args("2025-07-01", "2025-07-02").unwrap();

        let events = CalendarQuery::new(relay)
            .in_range(&range, &Cancellation::never())
            .await
            .unwrap();
        let mut found = ids(&events);
        found.sort_unstable();
        assert_eq!(found, vec!["day", "inside", "spanning"]);
    }

    struct StalledRelay;

    impl RelayClient for StalledRelay {
        async fn query(&self, _filters: &[Filter]) -> CalResult<Vec<RawEvent>> {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
            Ok(Vec::new())
        }

        async fn publish(&self, _event: &UnsignedEvent) -> CalResult<RawEvent> {
            std::future::pending().await
        }
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_slow_relay_times_out() {
        let query = CalendarQuery::new(StalledRelay).with_timeout(Duration::from_secs(2));
        let cancel = Cancellation::never();

        assert!(matches!(query.recent(10, &cancel).await, Err(CalendarError::QueryTimeout(2))));
        assert!(matches!(
            query.upcoming(10, None, &cancel).await,
            Err(CalendarError::QueryTimeout(2))
        ));
    }

    #[test_log::test(tokio::test)]
    async fn test_search_hashtag_path() {
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                raw(
                    "tagged",
                    31922,
                    10,
                    &[&["d", "t"], &["title", "Open air"], &["start", "2025-07-01"], &["t", "music"]],
                ),
                raw("plain", 31922, 20, &[&["d", "p"], &["title", "Chess"], &["start", "2025-07-02"]]),
            ],
        );

        let events = CalendarQuery::new(relay)
            .search("#music", 10, &Cancellation::never())
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["tagged"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_search_with_huge_limit() {
        let relay = MemoryRelay::with_events(
            "me",
            vec![raw("chess", 31922, 20, &[&["d", "c"], &["title", "Chess club"], &["start", "2025-07-02"]])],
        );

        let events = CalendarQuery::new(relay)
            .search("chess", usize::MAX, &Cancellation::never())
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["chess"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_search_empty_query() {
        let relay = MemoryRelay::with_events("me", vec![timed("a", 1, 2_000_000_000)]);
        let events = CalendarQuery::new(relay).search("   ", 10, &Cancellation::never()).await.unwrap();
        assert!(events.is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_event_by_coordinate_takes_latest() {
        let relay = MemoryRelay::with_events(
            "me",
            vec![
                raw("v1", 31923, 100, &[&["d", "meet"], &["title", "Old"], &["start", "2000000000"]]),
                raw("v2", 31923, 200, &[&["d", "meet"], &["title", "New"], &["start", "2000000000"]]),
            ],
        );
        let coordinate = Coordinate::new(31923, "pub1", "meet");

        let event = CalendarQuery::new(relay)
            .event(&coordinate, &Cancellation::never())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.title(), "New");
    }

    #[test_log::test(tokio::test)]
    async fn test_calendar_events_tolerates_dangling_refs() {
        let relay = MemoryRelay::with_events("me", vec![timed("a", 1, 2_000_000_000)]);
        let calendar = Calendar {
            id: "cal".into(),
            pubkey: "pub1".into(),
            created_at: 1,
            identifier: "community".into(),
            title: "Community".into(),
            content: String::new(),
            events: vec![
                Coordinate::new(31923, "pub1", "a"),
                Coordinate::new(31923, "pub1", "gone"),
            ],
        };

        let events = CalendarQuery::new(relay)
            .calendar_events(&calendar, &Cancellation::never())
            .await
            .unwrap();
        assert_eq!(ids(&events), vec!["a"]);
    }

    #[test_log::test(tokio::test)]
    async fn test_publish_event_and_rsvp() {
        let query = CalendarQuery::new(MemoryRelay::new("me"));
        let cancel = Cancellation::never();

        let draft = EventDraft::new(
            "Launch party",
            DraftTiming::Times {
                start: 2_000_000_000,
                end: Some(2_000_003_600),
                start_tzid: Some("Europe/Lisbon".into()),
                end_tzid: None,
            },
        );
        let event = query.publish_event(draft, &cancel).await.unwrap();
        assert_eq!(event.details().pubkey, "me");
        assert_eq!(event.title(), "Launch party");

        let rsvp = query
            .publish_rsvp(
                RsvpDraft::for_event(&event, RsvpStatus::Accepted).with_free_busy(FreeBusy::Busy),
                &cancel,
            )
            .await
            .unwrap();
        assert_eq!(rsvp.coordinate, event.coordinate().to_string());

        let rsvps = query.rsvps(&event.coordinate(), &cancel).await.unwrap();
        assert_eq!(rsvps.len(), 1);
        assert_eq!(rsvps[0].status, RsvpStatus::Accepted);
    }

    #[test_log::test(tokio::test)]
    async fn test_publish_rejects_bad_draft_before_relay() {
        let query = CalendarQuery::new(MemoryRelay::new("me"));
        let draft = RsvpDraft::new("31923:pub1:ev1", RsvpStatus::Declined).with_free_busy(FreeBusy::Free);

        let result = query.publish_rsvp(draft, &Cancellation::never()).await;
        assert!(matches!(result, Err(CalendarError::Draft(DraftError::FreeBusyOnDeclined))));
        assert!(query.relay().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_cancelled_query_fails() {
        let (canceller, cancel) = Cancellation::pair();
        canceller.cancel();
        let query = CalendarQuery::new(MemoryRelay::new("me"));
        assert!(matches!(query.recent(10, &cancel).await, Err(CalendarError::Cancelled)));
    }
}
