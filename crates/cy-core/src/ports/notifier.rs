/// User-visible notification side channel.
///
/// Delivery is best effort: implementations swallow and log their own
/// failures, the hub never waits on or checks the result.
pub trait NotifierPort: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}
