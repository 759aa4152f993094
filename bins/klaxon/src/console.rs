use std::time::{SystemTime, UNIX_EPOCH};

use klaxon_events::{Notice, NoticeKind, NoticeSink, Rejection};

/// Prints every notice to stdout, one line each.
pub struct ConsoleSink;

impl NoticeSink for ConsoleSink {
    fn emit(&self, notice: Notice) {
        println!("{}", render(&notice));
    }
}

fn unix_seconds(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

pub fn render(notice: &Notice) -> String {
    let id = notice.id;
    let t = unix_seconds(notice.at);
    match &notice.kind {
        NoticeKind::Accepted {
            interval_seconds,
            message,
        } => format!(
            "First Alarm Request With Message Number ({id}) Received at {t}: {interval_seconds} Message({id}) {message}"
        ),
        NoticeKind::Replaced {
            interval_seconds,
            message,
        } => format!(
            "Replacement Alarm Request With Message Number ({id}) Received at {t}: {interval_seconds} Message({id}) {message}"
        ),
        NoticeKind::CancelAccepted => format!(
            "Cancel Alarm Request With Message Number ({id}) Received at {t}: Cancel: Message({id})"
        ),
        NoticeKind::CancelRejected(Rejection::Unmatched) => {
            format!("Error: No Alarm Request With Message Number ({id}) to Cancel!")
        }
        NoticeKind::CancelRejected(Rejection::Duplicate) => format!(
            "Error: More Than One Request to Cancel Alarm Request With Message Number ({id})"
        ),
        NoticeKind::Displayed {
            interval_seconds,
            message,
        } => format!(
            "Alarm With Message Number ({id}) Displayed at {t}: {interval_seconds} Message({id}) {message}"
        ),
        NoticeKind::ReplacementApplied {
            interval_seconds,
            message,
        } => format!(
            "Alarm With Message Number ({id}) Replaced at {t}: {interval_seconds} Message({id}) {message}"
        ),
        NoticeKind::ReplacementDisplayed {
            interval_seconds,
            message,
        } => format!(
            "Replacement Alarm With Message Number ({id}) Displayed at {t}: {interval_seconds} Message({id}) {message}"
        ),
        NoticeKind::WorkerExited {
            interval_seconds,
            message,
        } => format!(
            "Display thread exiting at time {t}: {interval_seconds} Message({id}) {message}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klaxon_events::AlarmId;
    use std::time::Duration;

    fn at(kind: NoticeKind) -> Notice {
        Notice {
            id: AlarmId(5),
            at: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            kind,
        }
    }

    #[test]
    fn accepted_line() {
        let line = render(&at(NoticeKind::Accepted {
            interval_seconds: 10,
            message: "hi there".into(),
        }));
        assert_eq!(
            line,
            "First Alarm Request With Message Number (5) Received at 1700000000: 10 Message(5) hi there"
        );
    }

    #[test]
    fn cancel_lines() {
        assert_eq!(
            render(&at(NoticeKind::CancelAccepted)),
            "Cancel Alarm Request With Message Number (5) Received at 1700000000: Cancel: Message(5)"
        );
        assert_eq!(
            render(&at(NoticeKind::CancelRejected(Rejection::Unmatched))),
            "Error: No Alarm Request With Message Number (5) to Cancel!"
        );
    }

    #[test]
    fn duplicate_cancel_line() {
        assert_eq!(
            render(&at(NoticeKind::CancelRejected(Rejection::Duplicate))),
            "Error: More Than One Request to Cancel Alarm Request With Message Number (5)"
        );
    }

    #[test]
    fn display_lines() {
        assert_eq!(
            render(&at(NoticeKind::Displayed {
                interval_seconds: 2,
                message: "stretch".into(),
            })),
            "Alarm With Message Number (5) Displayed at 1700000000: 2 Message(5) stretch"
        );
        assert_eq!(
            render(&at(NoticeKind::ReplacementApplied {
                interval_seconds: 4,
                message: "drink water".into(),
            })),
            "Alarm With Message Number (5) Replaced at 1700000000: 4 Message(5) drink water"
        );
        assert_eq!(
            render(&at(NoticeKind::ReplacementDisplayed {
                interval_seconds: 4,
                message: "drink water".into(),
            })),
            "Replacement Alarm With Message Number (5) Displayed at 1700000000: 4 Message(5) drink water"
        );
    }

    #[test]
    fn exit_line_carries_last_message() {
        let line = render(&at(NoticeKind::WorkerExited {
            interval_seconds: 3,
            message: "bye".into(),
        }));
        assert_eq!(line, "Display thread exiting at time 1700000000: 3 Message(5) bye");
    }
}
