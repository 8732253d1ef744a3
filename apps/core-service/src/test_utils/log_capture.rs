//! ログキャプチャ
//!
//! `tracing` のイベントをメモリに記録する Layer。
//! 通知パイプラインが試行ごとに出力するログの件数・フィールドを検証する。

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex},
};

use tracing::{
    Event,
    Level,
    Subscriber,
    field::{Field, Visit},
    subscriber::DefaultGuard,
};
use tracing_subscriber::{
    Layer,
    layer::{Context, SubscriberExt as _},
};

/// 記録されたイベント
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level:  Level,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// イベントを記録する Layer
///
/// `Clone` は記録先を共有する。
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在のスレッドのデフォルト subscriber として登録する
    ///
    /// ガードを破棄すると登録が解除される。`#[tokio::test]` は
    /// カレントスレッドのランタイムで動くため、テスト内のログはすべて記録される。
    pub fn set_default(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// `event.action` が一致するイベント（出力順）
    pub fn events_with_action(&self, action: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.field("event.action") == Some(action))
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level:  *event.metadata().level(),
            fields: visitor.0,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(BTreeMap<String, String>);

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}
