use thiserror::Error;

/// Fallos del reproductor externo (songbird)
#[derive(Debug, Error)]
pub enum PlayerError {
    /// No hay una llamada de voz activa para el guild
    #[error("El bot no está conectado a un canal de voz")]
    NotConnected,

    /// El driver de audio rechazó la operación
    #[error("Error del driver de audio: {0}")]
    Driver(String),
}

/// Fallos al resolver una búsqueda o URL
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No se pudo ejecutar yt-dlp: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("yt-dlp terminó con error: {0}")]
    Process(String),

    #[error("La consulta está vacía")]
    EmptyQuery,
}
