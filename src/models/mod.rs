pub mod exercise;
pub mod from_row;
pub mod routine;
pub mod routine_item;
pub mod user;

pub use exercise::{Exercise, NewExercise};
pub use from_row::FromSqliteRow;
pub use routine::{NewRoutine, Routine, RoutineChanges, RoutineSummary, Weekday};
pub use routine_item::{NewRoutineItem, RoutineItem};
pub use user::{CreateStudent, NewStudent, User, UserRole};
