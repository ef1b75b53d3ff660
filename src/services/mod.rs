pub mod assistant;
pub mod identity;
pub mod news;
pub mod supabase;
pub mod tasks;
pub mod weather;
