pub mod categoria;
pub mod coordinates;
pub mod evento;
pub(crate) mod fields;
pub mod punto;
pub mod ruta;
pub mod usuario;

pub use categoria::CategoryLabel;
pub use coordinates::Coordinates;
pub use evento::{Evento, EventoConPunto};
pub use punto::Punto;
pub use ruta::{PuntoEnRuta, Ruta, RutaDetalle};
pub use usuario::Usuario;
