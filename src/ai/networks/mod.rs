pub mod action_value_head;
pub mod attention;
pub mod encoder;
pub mod relational_policy_network;

pub use action_value_head::{ActionValueHead, ActionValueHeadConfig};
pub use attention::{stable_softmax, RelationalAttention, RelationalAttentionConfig};
pub use encoder::{FeatureEncoder, FeatureEncoderConfig};
pub use relational_policy_network::{RelationalPolicyNetwork, RelationalPolicyNetworkConfig};
