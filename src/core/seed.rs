//! Built-in sample data used when nothing has been persisted yet

use chrono::NaiveDate;
use std::sync::Arc;

use crate::core::entity::{Priority, RiskLevel, Sector};
use crate::core::identity::RecordId;
use crate::core::state::AppState;
use crate::entities::document::{DocumentStatus, DocumentType};
use crate::entities::kpi::Trend;
use crate::entities::ncr::{ActionStatus, NonConformitySource, NonConformityStatus, Severity};
use crate::entities::opportunity::{OpportunityCategory, OpportunityStatus};
use crate::entities::pdca::{PdcaPhase, PdcaStatus};
use crate::entities::process::ProcessStatus;
use crate::entities::risk::{RiskCategory, RiskStatus};
use crate::entities::{
    CorrectiveAction, Document, Kpi, NonConformity, Opportunity, PdcaItem, Process, ProcessStep,
    Risk,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

fn s(text: &str) -> String {
    text.to_string()
}

/// The seed state: a small but complete quality system
///
/// Risk levels are computed from probability and impact, never copied.
pub fn initial_data() -> AppState {
    AppState {
        documents: Arc::new(documents()),
        processes: Arc::new(processes()),
        risks: Arc::new(risks()),
        opportunities: Arc::new(opportunities()),
        pdca_items: Arc::new(pdca_items()),
        non_conformities: Arc::new(non_conformities()),
        kpis: Arc::new(kpis()),
        dark_mode: false,
    }
}

fn documents() -> Vec<Document> {
    vec![
        Document {
            id: RecordId::new("1"),
            title: s("Manual de Calidad"),
            description: s("Manual principal del Sistema de Gestión de la Calidad"),
            file_name: s("manual-calidad-v3.1.pdf"),
            file_size: s("2.4 MB"),
            upload_date: day(2024, 1, 15),
            sector: Sector::Direccion,
            doc_type: DocumentType::Manual,
            status: DocumentStatus::Activo,
            version: s("3.1"),
            author: s("María González"),
            last_modified: day(2024, 1, 15),
        },
        Document {
            id: RecordId::new("2"),
            title: s("Procedimiento de Desarrollo de Software"),
            description: s("Procedimiento para el ciclo de vida del desarrollo de software"),
            file_name: s("proc-desarrollo-sw-v2.3.pdf"),
            file_size: s("1.8 MB"),
            upload_date: day(2024, 2, 10),
            sector: Sector::Desarrollo,
            doc_type: DocumentType::Procedimiento,
            status: DocumentStatus::Activo,
            version: s("2.3"),
            author: s("Carlos Rodríguez"),
            last_modified: day(2024, 2, 10),
        },
        Document {
            id: RecordId::new("3"),
            title: s("Política de Testing"),
            description: s("Política para asegurar la calidad en las pruebas de software"),
            file_name: s("politica-testing-v1.5.pdf"),
            file_size: s("850 KB"),
            upload_date: day(2024, 1, 20),
            sector: Sector::Qa,
            doc_type: DocumentType::Politica,
            status: DocumentStatus::Borrador,
            version: s("1.5"),
            author: s("Ana López"),
            last_modified: day(2024, 1, 20),
        },
        Document {
            id: RecordId::new("4"),
            title: s("Instructivo de Reclutamiento"),
            description: s("Instructivo para el proceso de selección de personal"),
            file_name: s("inst-reclutamiento-v1.2.pdf"),
            file_size: s("1.2 MB"),
            upload_date: day(2024, 3, 5),
            sector: Sector::Rrhh,
            doc_type: DocumentType::Instructivo,
            status: DocumentStatus::EnRevision,
            version: s("1.2"),
            author: s("Laura Martínez"),
            last_modified: day(2024, 3, 5),
        },
    ]
}

fn step(id: &str, name: &str, description: &str, responsible: &str, time: &str, resources: &[&str]) -> ProcessStep {
    ProcessStep {
        id: RecordId::new(id),
        name: s(name),
        description: s(description),
        responsible: s(responsible),
        estimated_time: s(time),
        resources: resources.iter().map(|r| s(r)).collect(),
    }
}

fn processes() -> Vec<Process> {
    vec![
        Process {
            id: RecordId::new("1"),
            name: s("Desarrollo de Software"),
            description: s("Proceso integral para el desarrollo de aplicaciones de software"),
            sector: Sector::Desarrollo,
            owner: s("Carlos Rodríguez"),
            status: ProcessStatus::Activo,
            last_review: day(2024, 1, 15),
            next_review: day(2024, 7, 15),
            version: s("2.1"),
            steps: vec![
                step(
                    "1-1",
                    "Análisis de Requerimientos",
                    "Relevamiento y documentación de requerimientos del cliente",
                    "Analista Funcional",
                    "2-3 días",
                    &["Documento de requerimientos", "Entrevistas con cliente"],
                ),
                step(
                    "1-2",
                    "Diseño de Arquitectura",
                    "Definición de la arquitectura técnica de la solución",
                    "Arquitecto de Software",
                    "1-2 días",
                    &["Herramientas de diseño", "Patrones de arquitectura"],
                ),
                step(
                    "1-3",
                    "Implementación",
                    "Codificación de la solución según especificaciones",
                    "Desarrollador",
                    "5-10 días",
                    &["IDE", "Frameworks", "Librerías"],
                ),
            ],
        },
        Process {
            id: RecordId::new("2"),
            name: s("Testing y QA"),
            description: s("Proceso de aseguramiento de la calidad del software"),
            sector: Sector::Qa,
            owner: s("Ana López"),
            status: ProcessStatus::Activo,
            last_review: day(2024, 2, 1),
            next_review: day(2024, 8, 1),
            version: s("1.8"),
            steps: vec![
                step(
                    "2-1",
                    "Planificación de Pruebas",
                    "Diseño del plan de pruebas y casos de test",
                    "QA Lead",
                    "1-2 días",
                    &["Casos de prueba", "Herramientas de testing"],
                ),
                step(
                    "2-2",
                    "Ejecución de Pruebas",
                    "Ejecución de casos de prueba manuales y automatizados",
                    "QA Tester",
                    "3-5 días",
                    &["Ambiente de testing", "Datos de prueba"],
                ),
            ],
        },
    ]
}

fn risks() -> Vec<Risk> {
    let risks = vec![
        Risk {
            id: RecordId::new("1"),
            title: s("Falla en Servidores de Producción"),
            description: s(
                "Riesgo de caída de servidores que afecte la disponibilidad del servicio",
            ),
            sector: Sector::Desarrollo,
            category: RiskCategory::Tecnologico,
            probability: RiskLevel::Medio,
            impact: RiskLevel::Alto,
            risk_level: RiskLevel::Medio,
            mitigation: s("Implementar redundancia y monitoreo 24/7"),
            responsible: s("Jefe de Infraestructura"),
            status: RiskStatus::EnTratamiento,
            identified_date: day(2024, 1, 10),
            review_date: day(2024, 4, 10),
        },
        Risk {
            id: RecordId::new("2"),
            title: s("Rotación de Personal Clave"),
            description: s("Pérdida de conocimiento crítico por salida de empleados senior"),
            sector: Sector::Rrhh,
            category: RiskCategory::Operacional,
            probability: RiskLevel::Medio,
            impact: RiskLevel::Medio,
            risk_level: RiskLevel::Medio,
            mitigation: s("Programa de mentorías y documentación del conocimiento"),
            responsible: s("Gerente de RRHH"),
            status: RiskStatus::Identificado,
            identified_date: day(2024, 2, 5),
            review_date: day(2024, 5, 5),
        },
        Risk {
            id: RecordId::new("3"),
            title: s("Vulnerabilidades de Seguridad"),
            description: s("Potenciales brechas de seguridad en las aplicaciones desarrolladas"),
            sector: Sector::Qa,
            category: RiskCategory::Tecnologico,
            probability: RiskLevel::Bajo,
            impact: RiskLevel::MuyAlto,
            risk_level: RiskLevel::Medio,
            mitigation: s(
                "Auditorías de seguridad regulares y capacitación en desarrollo seguro",
            ),
            responsible: s("Security Officer"),
            status: RiskStatus::Mitigado,
            identified_date: day(2024, 1, 20),
            review_date: day(2024, 4, 20),
        },
    ];
    risks.into_iter().map(Risk::recompute_level).collect()
}

fn opportunities() -> Vec<Opportunity> {
    vec![
        Opportunity {
            id: RecordId::new("1"),
            title: s("Automatización de Pruebas"),
            description: s(
                "Implementar herramientas de testing automatizado para mejorar eficiencia",
            ),
            sector: Sector::Qa,
            category: OpportunityCategory::Eficiencia,
            priority: Priority::Alta,
            expected_benefit: s("Reducción del 40% en tiempo de testing y mejora en cobertura"),
            responsible: s("Ana López"),
            status: OpportunityStatus::EnImplementacion,
            identified_date: day(2024, 1, 15),
            target_date: day(2024, 6, 30),
        },
        Opportunity {
            id: RecordId::new("2"),
            title: s("Capacitación en Metodologías Ágiles"),
            description: s("Formar equipos en Scrum y Kanban para mejorar productividad"),
            sector: Sector::Desarrollo,
            category: OpportunityCategory::MejoraProceso,
            priority: Priority::Media,
            expected_benefit: s("Mejora en tiempos de entrega y satisfacción del cliente"),
            responsible: s("Carlos Rodríguez"),
            status: OpportunityStatus::Identificada,
            identified_date: day(2024, 2, 1),
            target_date: day(2024, 8, 31),
        },
        Opportunity {
            id: RecordId::new("3"),
            title: s("Programa de Retención de Talento"),
            description: s("Desarrollar beneficios adicionales para retener empleados clave"),
            sector: Sector::Rrhh,
            category: OpportunityCategory::Talento,
            priority: Priority::Alta,
            expected_benefit: s("Reducción del 30% en rotación de personal"),
            responsible: s("Laura Martínez"),
            status: OpportunityStatus::EnEvaluacion,
            identified_date: day(2024, 2, 10),
            target_date: day(2024, 12, 31),
        },
    ]
}

fn pdca_items() -> Vec<PdcaItem> {
    vec![
        PdcaItem {
            id: RecordId::new("1"),
            title: s("Mejora en Proceso de Testing"),
            description: s("Optimizar el proceso de testing para reducir defectos"),
            phase: PdcaPhase::Do,
            sector: Sector::Qa,
            priority: Priority::Alta,
            responsible: s("Ana López"),
            status: PdcaStatus::EnProgreso,
            planned_actions: String::new(),
            actual_results: s("Implementación de nuevas herramientas de testing automatizado"),
            lessons: String::new(),
            next_steps: String::new(),
            created_date: day(2024, 1, 15),
            last_updated: day(2024, 1, 15),
            target_date: day(2024, 6, 15),
            completion_date: None,
        },
        PdcaItem {
            id: RecordId::new("2"),
            title: s("Estandarización de Documentación"),
            description: s("Unificar formatos y plantillas de documentos técnicos"),
            phase: PdcaPhase::Plan,
            sector: Sector::Desarrollo,
            priority: Priority::Media,
            responsible: s("Carlos Rodríguez"),
            status: PdcaStatus::Pendiente,
            planned_actions: String::new(),
            actual_results: String::new(),
            lessons: String::new(),
            next_steps: String::new(),
            created_date: day(2024, 3, 1),
            last_updated: day(2024, 3, 1),
            target_date: day(2024, 9, 1),
            completion_date: None,
        },
        PdcaItem {
            id: RecordId::new("3"),
            title: s("Evaluación de Satisfacción del Cliente"),
            description: s("Implementar encuestas regulares de satisfacción"),
            phase: PdcaPhase::Check,
            sector: Sector::Comercial,
            priority: Priority::Media,
            responsible: s("Roberto Silva"),
            status: PdcaStatus::Completado,
            planned_actions: String::new(),
            actual_results: s("Índice de satisfacción del 92%, identificadas 3 áreas de mejora"),
            lessons: String::new(),
            next_steps: s("Implementar plan de acción para áreas identificadas"),
            created_date: day(2024, 1, 1),
            last_updated: day(2024, 3, 25),
            target_date: day(2024, 3, 31),
            completion_date: Some(day(2024, 3, 25)),
        },
    ]
}

fn non_conformities() -> Vec<NonConformity> {
    vec![
        NonConformity {
            id: RecordId::new("1"),
            title: s("Falta de Validación en Formularios"),
            description: s("Se detectó falta de validación en formularios de entrada de datos"),
            sector: Sector::Desarrollo,
            severity: Severity::Moderada,
            source: NonConformitySource::AuditoriaInterna,
            identified_by: s("Ana López"),
            identified_date: day(2024, 2, 15),
            root_cause: Some(s(
                "Ausencia de checklist de validación en el proceso de desarrollo",
            )),
            corrective_actions: vec![
                CorrectiveAction {
                    status: ActionStatus::EnProgreso,
                    ..CorrectiveAction::new(
                        RecordId::new("1-1"),
                        s("Crear checklist de validaciones obligatorias"),
                        s("Carlos Rodríguez"),
                        day(2024, 4, 1),
                    )
                },
                CorrectiveAction::new(
                    RecordId::new("1-2"),
                    s("Capacitar equipo en mejores prácticas de validación"),
                    s("Tech Lead"),
                    day(2024, 4, 15),
                ),
            ],
            status: NonConformityStatus::EnTratamiento,
            close_date: None,
        },
        NonConformity {
            id: RecordId::new("2"),
            title: s("Documentos Desactualizados"),
            description: s("Se encontraron procedimientos con versiones obsoletas en uso"),
            sector: Sector::Administracion,
            severity: Severity::Menor,
            source: NonConformitySource::RevisionDireccion,
            identified_by: s("María González"),
            identified_date: day(2024, 1, 30),
            root_cause: Some(s("Falta de proceso de control de versiones documentales")),
            corrective_actions: vec![CorrectiveAction {
                completion_date: Some(day(2024, 2, 28)),
                status: ActionStatus::Completada,
                verification: Some(s("Sistema implementado y funcionando correctamente")),
                effectiveness: Some(s("Reducción del 95% en uso de documentos obsoletos")),
                ..CorrectiveAction::new(
                    RecordId::new("2-1"),
                    s("Implementar sistema de control de versiones"),
                    s("Responsable de Calidad"),
                    day(2024, 3, 1),
                )
            }],
            status: NonConformityStatus::Cerrada,
            close_date: Some(day(2024, 3, 15)),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn kpi(
    id: &str,
    name: &str,
    description: &str,
    sector: Sector,
    current_value: f64,
    target_value: f64,
    unit: &str,
    frequency: &str,
    trend: Trend,
    last_update: NaiveDate,
) -> Kpi {
    Kpi {
        id: RecordId::new(id),
        name: s(name),
        description: s(description),
        sector,
        current_value,
        target_value,
        unit: s(unit),
        frequency: s(frequency),
        trend,
        last_update,
    }
}

fn kpis() -> Vec<Kpi> {
    vec![
        kpi(
            "1",
            "Defectos por Release",
            "Cantidad de defectos encontrados por versión liberada",
            Sector::Qa,
            3.2,
            2.0,
            "defectos",
            "Por release",
            Trend::Down,
            day(2024, 3, 15),
        ),
        kpi(
            "2",
            "Tiempo de Resolución de Issues",
            "Tiempo promedio para resolver issues críticos",
            Sector::Desarrollo,
            4.5,
            3.0,
            "horas",
            "Semanal",
            Trend::Down,
            day(2024, 3, 20),
        ),
        kpi(
            "3",
            "Satisfacción del Cliente",
            "Índice de satisfacción basado en encuestas",
            Sector::Comercial,
            92.0,
            95.0,
            "%",
            "Mensual",
            Trend::Up,
            day(2024, 3, 1),
        ),
        kpi(
            "4",
            "Rotación de Personal",
            "Porcentaje anual de rotación de empleados",
            Sector::Rrhh,
            8.5,
            5.0,
            "%",
            "Anual",
            Trend::Stable,
            day(2024, 2, 29),
        ),
        kpi(
            "5",
            "Cobertura de Testing",
            "Porcentaje de código cubierto por pruebas automatizadas",
            Sector::Qa,
            78.0,
            85.0,
            "%",
            "Por sprint",
            Trend::Up,
            day(2024, 3, 18),
        ),
        kpi(
            "6",
            "Cumplimiento de Deadlines",
            "Porcentaje de proyectos entregados a tiempo",
            Sector::Desarrollo,
            85.0,
            90.0,
            "%",
            "Mensual",
            Trend::Up,
            day(2024, 3, 20),
        ),
    ]
}
