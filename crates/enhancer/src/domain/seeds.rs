//! Built-in templates used when no templates have been stored yet.

use uuid::Uuid;

use crate::domain::entities::PromptTemplate;

const SEEDS: &[(&str, &str)] = &[
    (
        "Fisica: Simulazione Pendolo (HTML/JS)",
        "**Ruolo:** Sei un esperto sviluppatore di simulazioni fisiche interattive (HTML, CSS, JavaScript).

**Obiettivo:** Crea un singolo file `index.html` autonomo con una simulazione didattica di un pendolo.

**Requisiti:**
*   Slider per lunghezza (0.5-5.0 m), gravità (1-20 m/s²), angolo iniziale (0-179°) e passo temporale.
*   Attrito viscoso attivabile con coefficiente regolabile.
*   Animazione su `<canvas>` e grafico θ(t) aggiornato in tempo reale.
*   Periodo teorico `T = 2π√(L/g)` confrontato con il periodo misurato.
*   Pulsanti Avvia/Pausa, Reset, Step ed Esporta CSV.
*   Integrazione numerica con il metodo di Runge-Kutta del 4° ordine.",
    ),
    (
        "Fisica: Simulazione Orbite (Python/Colab)",
        "**Ruolo:** Sei un fisico computazionale esperto di Python, NumPy e Matplotlib.

**Obiettivo:** Scrivi un notebook Google Colab che simuli l'orbita di un pianeta attorno a una stella.

**Requisiti:**
*   Integrazione con il metodo di Verlet e passo temporale configurabile.
*   Verifica numerica delle tre leggi di Keplero.
*   Grafico dell'orbita e dell'energia totale nel tempo.
*   Celle di testo in italiano che spiegano fisica e metodo numerico.",
    ),
    (
        "Matematica: Esploratore Serie Fourier (HTML/JS)",
        "**Ruolo:** Sei uno sviluppatore di strumenti didattici per la matematica.

**Obiettivo:** Crea una pagina `index.html` autonoma che mostri la ricostruzione di onde quadre, triangolari e a dente di sega tramite serie di Fourier.

**Requisiti:**
*   Slider per il numero di armoniche (1-50).
*   Visualizzazione degli epicicli rotanti e della somma parziale.
*   Evidenzia il fenomeno di Gibbs con una breve spiegazione.",
    ),
    (
        "Chimica: Simulatore di Titolazione (HTML/JS)",
        "**Ruolo:** Sei un esperto di chimica analitica e sviluppo web.

**Obiettivo:** Crea una pagina `index.html` che simuli una titolazione acido-base.

**Requisiti:**
*   Scelta tra acido forte/debole e base forte/debole, con concentrazioni e volumi regolabili.
*   Curva di titolazione pH vs volume aggiunto, calcolata in tempo reale.
*   Indicazione del punto di equivalenza e scelta dell'indicatore con cambio di colore.",
    ),
    (
        "Scienze Naturali: Ecosistema Preda-Predatore (HTML/JS)",
        "**Ruolo:** Sei un ecologo computazionale e sviluppatore JavaScript.

**Obiettivo:** Crea una pagina `index.html` che simuli il modello di Lotka-Volterra.

**Requisiti:**
*   Parametri α, β, γ, δ e popolazioni iniziali regolabili.
*   Grafico delle popolazioni nel tempo e diagramma di fase.
*   Spiegazione dei punti di equilibrio e dei cicli.",
    ),
    (
        "Geografia Astronomica: Fasi Lunari (HTML/JS)",
        "**Ruolo:** Sei un divulgatore di astronomia e sviluppatore web.

**Obiettivo:** Crea una pagina `index.html` che mostri le fasi lunari.

**Requisiti:**
*   Vista dall'alto del sistema Sole-Terra-Luna e vista della Luna dalla Terra, sincronizzate.
*   Slider per il giorno del mese sinodico (0-29.5) e animazione automatica.
*   Nome della fase corrente e percentuale di illuminazione.",
    ),
];

/// Fresh copies of the built-in templates, each with a new id
pub fn seed_templates() -> Vec<PromptTemplate> {
    SEEDS
        .iter()
        .map(|(title, prompt)| PromptTemplate {
            id: Uuid::new_v4().to_string(),
            title: (*title).to_string(),
            prompt: (*prompt).to_string(),
        })
        .collect()
}
