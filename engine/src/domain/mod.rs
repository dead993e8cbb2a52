//! Domain records mirrored by the stores.
//!
//! All records use the backend's JSON conventions: `_id` identifiers and
//! camelCase field names.

pub mod course;
pub mod food;
pub mod job;
pub mod message;
pub mod order;
pub mod post;
pub mod user;

pub use course::{Course, CourseLevel, CoursePatch, CourseProgress, CreateCourse, Lecture};
pub use food::Food;
pub use job::{Job, JobFilter, JobPatch, PostJob};
pub use message::{Message, MessagePatch, SendMessage};
pub use order::{Address, Order, OrderLine, OrderPatch, OrderStatus, PlaceOrder};
pub use post::{Comment, CreatePost, NewComment, Post, PostPatch};
pub use user::{User, UserPatch};
