pub mod alarm;
pub mod notice;
pub use alarm::{AlarmId, Command, EntryKind, Outcome};
pub use notice::{Notice, NoticeKind, NoticeSink, Rejection};
