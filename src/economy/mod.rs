pub mod merchant;
pub mod treasury;

pub use merchant::{BuyPrices, Merchant, MerchantType};
pub use treasury::Treasury;
