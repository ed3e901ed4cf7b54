pub mod subscription;
pub mod subscription_sum;
