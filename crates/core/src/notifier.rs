/// Receives the id of every file whose content versions were created, edited or deleted.
///
/// Implementations must return immediately. Delivery to listeners happens elsewhere.
pub trait ChangeNotifier: Send + Sync {
    fn notify(&self, file_id: &str);
}

/// Notifier that discards every change. Used when callbacks are disabled and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn notify(&self, _file_id: &str) {}
}
