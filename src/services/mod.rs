pub mod identify;
pub mod storage;
pub mod stores;
pub mod weather;

pub use identify::PlantIdentifier;
pub use storage::ConversationStore;
pub use stores::StoreLocator;
pub use weather::WeatherService;
