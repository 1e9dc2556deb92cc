pub mod check;
pub mod index;

pub trait Task: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self) -> anyhow::Result<()>;
}
