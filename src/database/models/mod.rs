pub mod commit;
pub mod course;
pub mod group;
pub mod message;
pub mod review;
pub mod task;
pub mod user;

pub use commit::{Commit, GroupCommit};
pub use course::{Course, JoinedCourse};
pub use group::{Group, GroupDetail, GroupMember, GroupSummary};
pub use message::Message;
pub use review::{Review, UserReview};
pub use task::{Task, TaskSummary};
pub use user::{PublicProfile, User, UserProfile};
