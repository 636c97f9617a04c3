pub mod reddit;
pub mod web3career;

pub use reddit::RedditFeed;
pub use web3career::Web3CareerFeed;
