pub use self::subscription::SubscriptionPayload;

mod subscription;
