// Narrative texts derived from the aggregated statistics.
// The texts only depend on the statistics passed as arguments.

use crate::config::*;

/// The kind of question, which selects the narrative templates.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum QuestionKind {
    Association,
    PricePerception,
    ExpertTrust,
    CommunicationQuality,
    BrandDescription,
    AddressesRealProblems,
    AdvisoryAdequacy,
    Other,
}

impl QuestionKind {
    pub fn from_field(field: Field) -> QuestionKind {
        match field {
            Field::BrandAssociation => QuestionKind::Association,
            Field::PricePerception => QuestionKind::PricePerception,
            Field::ExpertTrust => QuestionKind::ExpertTrust,
            Field::CommunicationQuality => QuestionKind::CommunicationQuality,
            Field::BrandDescription => QuestionKind::BrandDescription,
            Field::AddressesRealProblems => QuestionKind::AddressesRealProblems,
            Field::AdvisoryAdequacy => QuestionKind::AdvisoryAdequacy,
            _ => QuestionKind::Other,
        }
    }

    /// The market reading of the largest difference between the two groups.
    ///
    /// Arguments:
    /// * `item` the answer with the largest difference
    /// * `leader` the group with the higher share of this answer
    pub fn insight(&self, item: &str, leader: &str) -> String {
        match self {
            QuestionKind::Association => format!(
                "La brecha en \"{}\" indica que {} ha logrado consolidar mejor la imagen de Fybeca como destino dermocosmético. Esto podría deberse a una mayor madurez del mercado local o a campañas pasadas que resonaron mejor en esta región.",
                item, leader
            ),
            QuestionKind::PricePerception => {
                let lower = item.to_lowercase();
                if lower.contains("altos") {
                    format!(
                        "Es una alerta que en {} se perciba precios más altos. Esto puede generar una barrera de entrada que podría estar desviando tráfico a competidores con mejor percepción de \"value-for-money\".",
                        leader
                    )
                } else if lower.contains("bajos") {
                    format!(
                        "Que {} destaque en esta percepción es positivo, sugiriendo que la estrategia de precios o promociones está siendo interpretada correctamente como competitiva en esta plaza.",
                        leader
                    )
                } else {
                    format!(
                        "La diferencia en la percepción de \"{}\" sugiere que el posicionamiento de precio no es uniforme y requiere ajustes tácticos en la comunicación de {}.",
                        item, leader
                    )
                }
            }
            QuestionKind::ExpertTrust => format!(
                "El liderazgo de {} en el nivel \"{}\" valida la calidad del servicio en punto de venta. La confianza es el driver #1 en dermocosmética, por lo que esta plaza debe ser el modelo a seguir para la otra ciudad.",
                leader, item
            ),
            QuestionKind::CommunicationQuality => format!(
                "La comunicación en {} está siendo más efectiva para transmitir el mensaje (respuesta \"{}\"). Es necesario auditar los canales y mensajes utilizados en la ciudad con menor desempeño para cerrar esta brecha.",
                leader, item
            ),
            QuestionKind::BrandDescription => format!(
                "Que los usuarios de {} asocien más a la marca con \"{}\" revela el posicionamiento real en su \"Top of Mind\". Esta percepción debe ser alineada con los valores corporativos deseados.",
                leader, item
            ),
            QuestionKind::AddressesRealProblems => format!(
                "La percepción de que Fybeca \"{}\" en {} indica una conexión emocional más fuerte. Muestra que la oferta de productos está resolviendo necesidades (\"pains\") reales del cliente local.",
                item, leader
            ),
            QuestionKind::AdvisoryAdequacy => format!(
                "El diferencial en \"{}\" apunta directamente a la capacitación del personal. {} tiene equipos de farmacia que están logrando cerrar mejor la venta consultiva.",
                item, leader
            ),
            QuestionKind::Other => format!(
                "Esta diferencia significativa en \"{}\" resalta un comportamiento de consumo distinto en {}, lo que justifica una segmentación regional en la estrategia de marketing y mix de productos.",
                item, leader
            ),
        }
    }

    /// The recommended action, if any, for this kind of question.
    ///
    /// `trailing` is the group with the lower share on the largest difference.
    pub fn recommendation(&self, trailing: &str) -> Option<String> {
        match self {
            QuestionKind::PricePerception => Some(
                "Implementar una campaña de \"Precios Justos\" focalizada en Quito para equilibrar la percepción de valor. Activar una pieza aon en la campaña de Pricing Dermo para reforzar el mensaje de \"precios más bajos\" y posicionar en el TOM de los clientes el mensaje de \"Fybeca tiene precios más bajos que la competencia\"".to_string(),
            ),
            QuestionKind::Association => Some(format!(
                "Reforzar la presencia de marca en {} mediante activaciones BTL que vinculen a Fybeca con experto en piel.",
                trailing
            )),
            QuestionKind::ExpertTrust => Some(format!(
                "Capacitar al personal en {} para mejorar la asesoría y elevar el nivel de confianza técnica.",
                trailing
            )),
            QuestionKind::AdvisoryAdequacy => Some(
                "Investigar a profundidad las barreras en Guayaquil y adaptar el mensaje publicitario para mejorar la compresión de las campañas con la cultura local.".to_string(),
            ),
            QuestionKind::BrandDescription => Some(
                "Reforzar en Guayaquil el atributo de confianza con mensajes claros y consistentes.".to_string(),
            ),
            QuestionKind::AddressesRealProblems => Some(
                "Reforzar mensajes que conecten con problemas reales de la piel, especialmente en Guayaquil.".to_string(),
            ),
            QuestionKind::CommunicationQuality => Some(
                "Ajustar el tono y la estructura del mensaje para mejorar la comprensión en Guayaquil.".to_string(),
            ),
            QuestionKind::Other => None,
        }
    }
}

/// The one-line summary of the largest difference of a comparison.
pub fn key_difference(item: &str, leader: &str, diff: f64) -> String {
    format!(
        "En la opción \"{}\", {} supera a la otra ciudad por {:.1} puntos porcentuales.",
        item, leader, diff
    )
}

/// The texts that accompany a comparison on its largest difference.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ComparisonNarrative {
    pub leader: String,
    pub key_difference: String,
    pub insight: String,
    pub recommendation: Option<String>,
}

/// Describes the largest difference of a comparison. Returns `None` when the
/// two groups have no answer at all.
pub fn describe_comparison(cmp: &Comparison) -> Option<ComparisonNarrative> {
    let entry = cmp.max_difference.as_ref()?;
    let (leader, trailing) = cmp.leading_groups()?;
    let kind = QuestionKind::from_field(cmp.field);
    Some(ComparisonNarrative {
        leader: leader.to_string(),
        key_difference: key_difference(&entry.name, leader, entry.diff),
        insight: kind.insight(&entry.name, leader),
        recommendation: kind.recommendation(trailing),
    })
}

/// The main takeaways of one city, from its association, price and trust tables.
#[derive(PartialEq, Debug, Clone)]
pub struct CityHighlights {
    pub city: String,
    pub association: Option<DistributionEntry>,
    /// The leading association answer reads as a strength of the brand.
    pub association_is_strength: bool,
    pub price: Option<DistributionEntry>,
    pub trust: Option<DistributionEntry>,
}

impl CityHighlights {
    pub fn new(
        city: &str,
        association: &Distribution,
        price: &Distribution,
        trust: &Distribution,
    ) -> CityHighlights {
        let association_top = association.top().cloned();
        let association_is_strength = association_top
            .as_ref()
            .map(|e| e.name.contains("Muy") || e.name.contains("Alguna"))
            .unwrap_or(false);
        CityHighlights {
            city: city.to_string(),
            association: association_top,
            association_is_strength,
            price: price.top().cloned(),
            trust: trust.top().cloned(),
        }
    }

    pub fn association_text(&self) -> String {
        let (percent, name) = match &self.association {
            Some(e) => (e.percent, e.name.to_lowercase()),
            None => (0.0, "tienen esta percepción".to_string()),
        };
        let reading = if self.association_is_strength {
            "fortaleza"
        } else {
            "área de oportunidad"
        };
        format!(
            "La asociación de marca en {} muestra que un {:.1}% de los encuestados {}. Esto sugiere una {} en la mente del consumidor local.",
            self.city, percent, name, reading
        )
    }

    pub fn price_text(&self) -> String {
        let (percent, name) = match &self.price {
            Some(e) => (e.percent, e.name.as_str()),
            None => (0.0, ""),
        };
        format!(
            "En cuanto a precios, la percepción dominante ({:.1}%) es que son \"{}\". Es crucial ajustar la comunicación promocional en esta plaza para alinear la percepción de valor con la realidad comercial.",
            percent, name
        )
    }

    pub fn trust_text(&self) -> String {
        let name = self.trust.as_ref().map(|e| e.name.as_str()).unwrap_or("");
        format!(
            "La confianza como experta alcanza un nivel destacado en el segmento \"{}\", lo que valida la estrategia de posicionamiento técnico en dermocosmética para el mercado de {}.",
            name, self.city
        )
    }

    /// The tactical recommendations for the city.
    pub fn recommendations(&self) -> Vec<String> {
        let mut res: Vec<String> = Vec::new();
        res.push(if self.city == City::Quito.as_str() {
            "Fortalecer Asociación: Capitalizar la alta asociación reforzando el mensaje de variedad.".to_string()
        } else {
            "Fortalecer Asociación: Incrementar visibilidad de marca con campañas de alcance masivo.".to_string()
        });
        let competitive_prices = self
            .price
            .as_ref()
            .map(|e| e.name.contains("Más bajos"))
            .unwrap_or(false);
        res.push(if competitive_prices {
            "Estrategia de Precios: Mantener la percepción de precios competitivos.".to_string()
        } else {
            "Estrategia de Precios: Comunicar ofertas de valor y packs de ahorro para mejorar percepción.".to_string()
        });
        if let Some(trust) = &self.trust {
            res.push(format!(
                "Confianza Técnica: Aprovechar el {:.2}% de confianza en \"{}\" para posicionar servicios de dermo-análisis gratuitos en punto de venta.",
                trust.percent, trust.name
            ));
        }
        res.push("Estrategia de Comunicación: Activar una pieza aon en la campaña de Pricing Dermo para reforzar el mensaje de \"precios más bajos\" y posicionar en el TOM de los clientes el mensaje de \"Fybeca tiene precios más bajos que la competencia\"".to_string());
        if self.city == City::Guayaquil.as_str() {
            res.push("Adaptación Cultural: Generar en las campañas de Beauty y Dermo una pieza específica adaptada al tono y códigos culturales de la región Costa.".to_string());
        }
        res
    }
}
